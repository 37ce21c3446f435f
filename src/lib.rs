//! Compiler for a small VLSM addressing language.
//!
//! Source statements of the form
//!
//! ```text
//! IP 192.168.1.0 MASK /24 HOSTS 50,20 NAME Oficina;
//! ```
//!
//! are lexed, parsed, checked, lowered to IR, optimized and encoded as a
//! `VLSMOBJ` object file, which [`runtime::Vm`] replays as a text trace.

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod pipeline;
pub mod render;
pub mod runtime;
pub mod semantic;

pub use pipeline::{Compilation, compile};
