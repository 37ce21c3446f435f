//! Addressing and capacity checks over parsed blocks.

pub mod analyzer;
pub mod semantic_error;

pub use analyzer::{Analysis, analyze, check_block};
pub use semantic_error::{SemanticError, SemanticErrorKind};
