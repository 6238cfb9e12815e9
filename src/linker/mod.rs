//! Turns a `parser::ast::RawProgram` into a fully resolved `module::Module`.
//!
//! Grounded on `dereferece_labels_text`, `dereferece_labels_data`, and the
//! tail of `load_eir_impl` in `examples/original_source/my_ir/ir.cc`, with
//! the numbered-`.data N`-section concatenation added back in (the
//! transcribed original computes a section number and then discards it,
//! flattening everything into one list regardless).

use log::{debug, info, warn};

use crate::error::{EirError, LinkError};
use crate::ir::Op;
use crate::module::{Instruction, Module, ResolvedOperand};
use crate::parser::ast::{DataItem, Operand, RawInstruction, RawProgram};

use symbol_table::SymbolTable;

pub mod symbol_table;

pub fn link(program: RawProgram) -> Result<Module, EirError> {
    let RawProgram {
        text,
        text_labels: raw_text_labels,
        data_sections,
    } = program;

    let mut text_labels = SymbolTable::new();
    for (name, index) in raw_text_labels {
        text_labels.declare(name, index)?;
    }
    debug!("declared {} text label(s)", text_labels.len());

    let mut sections = data_sections;
    sections.sort_by_key(|s| s.key);
    debug!("concatenating {} data section(s) in ascending key order", sections.len());

    let mut data_labels = SymbolTable::new();
    let mut flat_items: Vec<DataItem> = Vec::new();
    for section in &sections {
        let base = flat_items.len();
        for (name, local_offset) in &section.labels {
            data_labels.declare(name.clone(), base + local_offset)?;
        }
        flat_items.extend(section.items.iter().cloned());
        debug!("section {} rebased onto offset {}", section.key, base);
    }

    let total_len = flat_items.len();
    data_labels.bind("_edata", total_len);
    debug!("bound `_edata` to {}", total_len);

    let mut data = Vec::with_capacity(total_len + 1);
    for item in &flat_items {
        let value = match item {
            DataItem::Value(v) => *v,
            DataItem::LabelRef(name) => data_labels.resolve(name)? as u32,
        };
        data.push(value);
    }
    data.push((total_len + 1) as u32);

    let resolved_text: Vec<Instruction> = text
        .into_iter()
        .map(|inst| resolve_instruction(inst, &text_labels, &data_labels))
        .collect::<Result<_, EirError>>()?;

    let entry = text_labels.get("main").unwrap_or(0);
    info!(
        "linked: entry={}, {} instruction(s), {} data word(s)",
        entry,
        resolved_text.len(),
        data.len()
    );

    Ok(Module {
        text: resolved_text,
        data,
        entry,
    })
}

fn resolve_instruction(
    inst: RawInstruction,
    text_labels: &SymbolTable,
    data_labels: &SymbolTable,
) -> Result<Instruction, EirError> {
    let RawInstruction {
        op, dst, src, jmp, ..
    } = inst;

    let jmp = match jmp {
        None => None,
        Some(Operand::Label(name)) => {
            Some(ResolvedOperand::Imm(text_labels.resolve(&name)? as u32))
        }
        Some(other) => Some(resolve_plain(other)?),
    };

    // `MOV` is the only instruction whose `src` may name a label; per the
    // original's `dereferece_labels_text`, the data-label map is searched
    // before the text-label map.
    let src = match (op, src) {
        (Op::Mov, Some(Operand::Label(name))) => {
            let index = data_labels
                .get(&name)
                .or_else(|| text_labels.get(&name))
                .ok_or_else(|| {
                    warn!("undefined label `{}` referenced by mov", name);
                    LinkError::UndefinedLabel(name.clone())
                })?;
            Some(ResolvedOperand::Imm(index as u32))
        }
        (_, Some(other)) => Some(resolve_plain(other)?),
        (_, None) => None,
    };

    let dst = match dst {
        Some(other) => Some(resolve_plain(other)?),
        None => None,
    };

    Ok(Instruction { op, dst, src, jmp })
}

fn resolve_plain(operand: Operand) -> Result<ResolvedOperand, EirError> {
    match operand {
        Operand::Reg(r) => Ok(ResolvedOperand::Reg(r)),
        Operand::Imm(v) => Ok(ResolvedOperand::Imm(v)),
        Operand::Label(name) => {
            warn!("label `{}` in an operand position that cannot reference one", name);
            Err(LinkError::UndefinedLabel(name).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Register;
    use crate::parser::parse_module;

    fn link_source(src: &str) -> Module {
        link(parse_module(src).unwrap()).unwrap()
    }

    #[test]
    fn entry_defaults_to_zero_without_main_label() {
        let m = link_source(".text\nexit\n");
        assert_eq!(m.entry, 0);
    }

    #[test]
    fn entry_follows_main_label() {
        let m = link_source(".text\njmp skip\nmain:\nexit\nskip:\njmp main\n");
        assert_eq!(m.entry, 1);
    }

    #[test]
    fn jump_labels_resolve_to_text_index() {
        let m = link_source(".text\njmp target\ntarget:\nexit\n");
        assert_eq!(
            m.text[0].jmp,
            Some(ResolvedOperand::Imm(1))
        );
    }

    #[test]
    fn undefined_jump_label_is_an_error() {
        let result = link(parse_module(".text\njmp nowhere\n").unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn mov_prefers_data_label_over_text_label() {
        let m = link_source(".data\nx:\n.long 9\n.text\nx:\nmov A, x\nexit\n");
        assert_eq!(m.text[0].src, Some(ResolvedOperand::Imm(0)));
    }

    #[test]
    fn edata_equals_total_data_length_and_sentinel_follows() {
        let m = link_source(".data\nx:\n.long 1\n.long 2\n.text\nmov A, _edata\nexit\n");
        assert_eq!(m.text[0].src, Some(ResolvedOperand::Imm(2)));
        assert_eq!(m.data, vec![1, 2, 3]);
    }

    #[test]
    fn numbered_sections_concatenate_in_ascending_key_order() {
        let m = link_source(".data 2\n.long 20\n.data 1\n.long 10\n.text\nexit\n");
        assert_eq!(m.data, vec![10, 20, 3]);
    }

    #[test]
    fn duplicate_label_across_sections_is_an_error() {
        let result = link(
            parse_module(".data 1\nx:\n.long 1\n.data 2\nx:\n.long 2\n.text\nexit\n").unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn store_resolves_address_and_value_operands() {
        let m = link_source(".text\nmov A, 1\nstore A, 2\nexit\n");
        assert_eq!(m.text[1].dst, Some(ResolvedOperand::Imm(2)));
        assert_eq!(m.text[1].src, Some(ResolvedOperand::Reg(Register::A)));
    }
}
