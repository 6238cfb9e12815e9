//! A label → index table used for both the text and data label maps.
//!
//! The teacher's `SymbolTable` (`src/first_pass/symbol_table.rs` in
//! `examples/adhirajagarwala-lc3-assembler`) is a linear `Vec<(String, u16)>`
//! scan, sized for hand-written assembly programs with at most a few hundred
//! labels. The EIR fixtures this crate targets include self-hosted compiler
//! output (`examples/original_source`'s `8cc.c.eir`) with label counts in the
//! thousands, so this table is HashMap-backed instead, matching the
//! original's own `unordered_map`-based `LabelRefMap`.

use std::collections::HashMap;

use log::warn;

use crate::error::LinkError;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            entries: HashMap::new(),
        }
    }

    /// Insert a label at `index`, rejecting a redeclaration.
    pub fn declare(&mut self, label: impl Into<String>, index: usize) -> Result<(), LinkError> {
        let label = label.into();
        if self.entries.contains_key(&label) {
            warn!("label `{}` is already defined, rejecting redeclaration at index {}", label, index);
            return Err(LinkError::DuplicateLabel(label));
        }
        self.entries.insert(label, index);
        Ok(())
    }

    /// Unconditionally bind a label, overwriting any prior value — used only
    /// for the reserved `_edata` symbol, which is installed by the linker
    /// itself rather than declared by source text.
    pub fn bind(&mut self, label: impl Into<String>, index: usize) {
        self.entries.insert(label.into(), index);
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries.get(label).copied()
    }

    pub fn resolve(&self, label: &str) -> Result<usize, LinkError> {
        self.get(label).ok_or_else(|| {
            warn!("undefined label `{}`", label);
            LinkError::UndefinedLabel(label.to_string())
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
