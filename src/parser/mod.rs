//! Recursive-descent parser: `Reader` bytes in, `ast::RawProgram` out.
//!
//! Grounded on `get_exprs`/`read_text`/`read_data`/`read_typevals`/
//! `read_value`/`load_eir_impl` in `examples/original_source/my_ir/ir.cc`.
//! The original accumulates instructions through mutual recursion
//! (`get_exprs` calls itself after each instruction) and aborts via `assert`
//! on anything malformed; this version walks the same grammar with plain
//! loops and returns `Result<_, EirError>` at the first error, matching the
//! fail-fast redesign in SPEC_FULL.md section 10.2. Self-hosted EIR programs
//! (the `8cc`-generated fixtures under `examples/original_source`) run into
//! the thousands of instructions, and recursion-per-instruction would be an
//! avoidable stack risk for no benefit.

pub mod ast;


use std::collections::HashMap;

use log::{debug, info, warn};

use crate::error::EirError;
use crate::ir::{reduce, Op, Register};
use crate::reader::Reader;

use ast::{DataItem, DataSection, Operand, RawInstruction, RawProgram};

/// Parse a complete EIR source file into its unresolved (pre-link) form.
pub fn parse_module(source: &str) -> Result<RawProgram, EirError> {
    let mut reader = Reader::new(source.as_bytes());
    let mut text = Vec::new();
    let mut text_labels = HashMap::new();
    let mut data_sections: Vec<DataSection> = Vec::new();

    while !reader.is_end() {
        let mark = reader.get_pos();
        if reader.accept(".data") {
            let key = read_section_key(&mut reader)?;
            debug!("line {}: entering .data section {}", reader.line(), key);
            let section = read_data_section(&mut reader, key)?;
            info!(
                "line {}: .data section {} closed with {} item(s)",
                reader.line(),
                key,
                section.items.len()
            );
            data_sections.push(section);
        } else {
            reader.accept(".text");
            debug!("line {}: entering .text segment", reader.line());
            read_text(&mut reader, &mut text, &mut text_labels)?;
        }
        if reader.get_pos() == mark {
            let message = "unexpected token (not an opcode, label, or segment directive)";
            warn!("line {}: {}", reader.line(), message);
            return Err(EirError::parse(reader.line(), message));
        }
    }

    info!(
        "parsed {} text instruction(s), {} data section(s)",
        text.len(),
        data_sections.len()
    );
    Ok(RawProgram {
        text,
        text_labels,
        data_sections,
    })
}

/// `.data` may optionally be followed by a decimal bucket number; bare
/// `.data` is bucket 0.
fn read_section_key(reader: &mut Reader) -> Result<u32, EirError> {
    let mark = reader.get_pos();
    let word = reader.token_word();
    if word.is_empty() || !word.bytes().all(|b| b.is_ascii_digit()) {
        reader.set_pos(mark);
        return Ok(0);
    }
    word.parse::<u32>().map_err(|_| {
        let message = format!("invalid .data section number `{}`", word);
        warn!("line {}: {}", reader.line(), message);
        EirError::parse(reader.line(), message)
    })
}

/// Skip `#`, `.loc`, `.file`, and stray `.text` comment/directive lines —
/// anything the original discards with `skip_until_ret`.
fn skip_directives(reader: &mut Reader) {
    while reader.accept("#") || reader.accept(".loc") || reader.accept(".file") || reader.accept(".text") {
        reader.skip_until_ret();
    }
}

fn read_text(
    reader: &mut Reader,
    text: &mut Vec<RawInstruction>,
    text_labels: &mut HashMap<String, usize>,
) -> Result<(), EirError> {
    loop {
        loop {
            skip_directives(reader);
            let mark = reader.get_pos();
            let word = reader.token_word();
            if word.is_empty() {
                reader.set_pos(mark);
                break;
            }
            if reader.accept(":") {
                // a label declaration, not an instruction — hand back to the
                // outer loop unconsumed.
                reader.set_pos(mark);
                break;
            }
            let op = match Op::parse(&word) {
                Some(op) => op,
                None => {
                    reader.set_pos(mark);
                    break;
                }
            };
            let line = reader.line();
            let inst = parse_instruction_body(op, line, reader)?;
            text.push(inst);
        }

        if reader.is_end() {
            break;
        }
        let mark = reader.get_pos();
        let label = reader.token_word();
        if label.is_empty() || !reader.accept(":") {
            reader.set_pos(mark);
            break;
        }
        if text_labels.contains_key(&label) {
            let message = format!("label `{}` is already defined", label);
            warn!("line {}: {}", reader.line(), message);
            return Err(EirError::parse(reader.line(), message));
        }
        debug!("line {}: text label `{}` -> index {}", reader.line(), label, text.len());
        text_labels.insert(label, text.len());
    }
    Ok(())
}

fn parse_instruction_body(op: Op, line: usize, reader: &mut Reader) -> Result<RawInstruction, EirError> {
    let mut inst = RawInstruction {
        op,
        dst: None,
        src: None,
        jmp: None,
        line,
    };

    if op.is_jump() {
        let target = read_value(reader)?;
        if matches!(target, Operand::Imm(_)) {
            let message = "jump target must be a register or label, not a literal";
            warn!("line {}: {}", line, message);
            return Err(EirError::parse(line, message));
        }
        inst.jmp = Some(target);
        if op != Op::Jmp {
            reader.expect(",")?;
            let dst = read_value(reader)?;
            if !matches!(dst, Operand::Reg(_)) {
                let message = "comparison destination must be a register";
                warn!("line {}: {}", line, message);
                return Err(EirError::parse(line, message));
            }
            reader.expect(",")?;
            let src = read_value(reader)?;
            inst.dst = Some(dst);
            inst.src = Some(src);
        }
        return Ok(inst);
    }

    match op {
        Op::Putc => {
            let v = read_value(reader)?;
            if v.is_label() {
                let message = "putc operand may not be a label";
                warn!("line {}: {}", line, message);
                return Err(EirError::parse(line, message));
            }
            inst.src = Some(v);
        }
        Op::Getc => {
            let v = read_value(reader)?;
            if !matches!(v, Operand::Reg(_)) {
                let message = "getc operand must be a register";
                warn!("line {}: {}", line, message);
                return Err(EirError::parse(line, message));
            }
            inst.src = Some(v);
        }
        Op::Exit | Op::Dump => {}
        Op::Mov | Op::Add | Op::Sub | Op::Load | Op::Store | Op::Eq | Op::Ne | Op::Lt | Op::Gt
        | Op::Le | Op::Ge => {
            let first = read_value(reader)?;
            reader.expect(",")?;
            let second = read_value(reader)?;
            if op != Op::Mov && second.is_label() {
                let message = "second operand may not be a label";
                warn!("line {}: {}", line, message);
                return Err(EirError::parse(line, message));
            }
            if op == Op::Store {
                inst.dst = Some(second);
                inst.src = Some(first);
            } else {
                inst.dst = Some(first);
                inst.src = Some(second);
            }
        }
        Op::Jmp | Op::Jeq | Op::Jne | Op::Jlt | Op::Jgt | Op::Jle | Op::Jge => unreachable!(),
    }

    debug!("line {}: parsed `{}` instruction", line, op);
    Ok(inst)
}

fn read_data_section(reader: &mut Reader, key: u32) -> Result<DataSection, EirError> {
    let mut labels = HashMap::new();
    let mut items = Vec::new();

    loop {
        let mark = reader.get_pos();
        let word = reader.token_word();
        if !word.is_empty() && reader.accept(":") {
            if labels.contains_key(&word) {
                let message = format!("label `{}` is already defined", word);
                warn!("line {}: {}", reader.line(), message);
                return Err(EirError::parse(reader.line(), message));
            }
            debug!("line {}: data label `{}` -> item {}", reader.line(), word, items.len());
            labels.insert(word, items.len());
        } else {
            reader.set_pos(mark);
        }

        let added = read_typevals(reader, &mut items)?;
        if added == 0 {
            break;
        }
    }

    Ok(DataSection { key, labels, items })
}

/// Reads as many `.long`/`.string` items as appear consecutively, returning
/// how many were appended. Zero means the data body (and section) ended.
fn read_typevals(reader: &mut Reader, items: &mut Vec<DataItem>) -> Result<usize, EirError> {
    let mut count = 0;
    loop {
        if reader.accept(".string") {
            reader.skip_spaces();
            let s = reader.literal()?;
            for byte in s.iter().copied() {
                items.push(DataItem::Value(byte as u32));
            }
            count += s.len();
        } else if reader.accept(".long") {
            let v = read_value(reader)?;
            match v {
                Operand::Imm(n) => items.push(DataItem::Value(n)),
                Operand::Label(name) => items.push(DataItem::LabelRef(name)),
                Operand::Reg(_) => {
                    let message = ".long operand may not be a register";
                    warn!("line {}: {}", reader.line(), message);
                    return Err(EirError::parse(reader.line(), message));
                }
            }
            count += 1;
        } else {
            break;
        }
    }
    Ok(count)
}

/// Parse one value: a (possibly negative) decimal immediate, a register
/// name, or a bare identifier taken as a label reference.
fn read_value(reader: &mut Reader) -> Result<Operand, EirError> {
    reader.skip_spaces();
    let negative = reader.peek() == Some(b'-');
    if negative {
        reader.expect("-")?;
    }
    let word = reader.token_word();
    if word.is_empty() {
        let message = "expected a value";
        warn!("line {}: {}", reader.line(), message);
        return Err(EirError::parse(reader.line(), message));
    }

    let looks_numeric = word.as_bytes()[0].is_ascii_digit();
    if negative && !looks_numeric {
        let message = "expected a number after `-`";
        warn!("line {}: {}", reader.line(), message);
        return Err(EirError::parse(reader.line(), message));
    }

    if looks_numeric {
        if !word.bytes().all(|b| b.is_ascii_digit()) {
            let message = format!("invalid number `{}`", word);
            warn!("line {}: {}", reader.line(), message);
            return Err(EirError::parse(reader.line(), message));
        }
        let magnitude: i64 = word.parse().map_err(|_| {
            let message = format!("number `{}` out of range", word);
            warn!("line {}: {}", reader.line(), message);
            EirError::parse(reader.line(), message)
        })?;
        let signed = if negative { -magnitude } else { magnitude };
        return Ok(Operand::Imm(reduce(signed)));
    }

    if let Some(reg) = Register::parse(&word) {
        return Ok(Operand::Reg(reg));
    }

    Ok(Operand::Label(word))
}
