//! Crate-wide error type.
//!
//! The original tool aborts via `assert` on any malformed input (see
//! `examples/original_source/my_ir/ir.cc`). Section 9 of the specification
//! recommends replacing that with a small, result-returning error enum
//! instead; this module is that redesign.

use thiserror::Error;

/// Top-level error returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum EirError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("link error: {0}")]
    Link(#[from] LinkError),

    #[error("runtime fault: {0}")]
    Runtime(#[from] RuntimeError),
}

impl EirError {
    pub fn parse(line: usize, message: impl Into<String>) -> EirError {
        EirError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Semantic errors raised while resolving labels into indices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),

    #[error("label `{0}` is already defined")]
    DuplicateLabel(String),

    #[error("jump target must be a register or label, not a literal code index")]
    JumpToImmediate,
}

/// Faults raised by the interpreter while executing a resolved module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("program counter {0} is out of range of the text segment")]
    ProgramCounterOutOfRange(usize),

    #[error("memory address {0} is out of range")]
    MemoryAddressOutOfRange(u32),

    #[error("encountered an unencoded or unset opcode at pc {0}")]
    UnsetOpcode(usize),
}
