//! A loader, linker, and interpreter for the EIR textual intermediate
//! representation.
//!
//! The pipeline mirrors the stage-per-module layout of a traditional
//! assembler: [`reader`] is the byte cursor, [`parser`] turns it into an
//! unresolved [`parser::ast::RawProgram`], [`linker`] resolves every label
//! into a concrete index and produces a [`module::Module`], and [`interp`]
//! executes that module. [`error`] carries the single error type threaded
//! through all four stages with `?`.
//!
//! ```no_run
//! use std::io;
//!
//! let source = ".text\nputc 65\nexit\n";
//! let program = eir::parser::parse_module(source)?;
//! let module = eir::linker::link(program)?;
//! let mut vm = eir::interp::Vm::new(&module);
//! vm.run(&module, &mut io::stdin(), &mut io::stdout())?;
//! # Ok::<(), eir::error::EirError>(())
//! ```

pub mod error;
pub mod interp;
pub mod ir;
pub mod linker;
pub mod module;
pub mod parser;
pub mod reader;
