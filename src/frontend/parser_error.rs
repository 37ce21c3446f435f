use thiserror::Error;

use crate::frontend::token::TokenKind;

/// A syntax error with source location.
///
/// `line` is 1-based and `col` 0-based, both taken from the lexer spans.
/// For errors at end of input the parser falls back to the last consumed
/// token's span, so a location is always available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    /// A token of the wrong kind where `expected` was required.
    #[error("{line}:{col}: expected {expected}, found {found} '{lexeme}'")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        lexeme: String,
        line: usize,
        col: usize,
    },

    /// Input ended while `expected` was still required.
    #[error("{line}:{col}: expected {expected}, found end of input")]
    UnexpectedEof {
        expected: TokenKind,
        line: usize,
        col: usize,
    },

    /// A host count that does not fit in 32 bits.
    #[error("{line}:{col}: host count '{lexeme}' is out of range")]
    HostCountOutOfRange {
        lexeme: String,
        line: usize,
        col: usize,
    },
}

impl ParserError {
    pub fn line(&self) -> usize {
        match self {
            ParserError::UnexpectedToken { line, .. }
            | ParserError::UnexpectedEof { line, .. }
            | ParserError::HostCountOutOfRange { line, .. } => *line,
        }
    }

    pub fn col(&self) -> usize {
        match self {
            ParserError::UnexpectedToken { col, .. }
            | ParserError::UnexpectedEof { col, .. }
            | ParserError::HostCountOutOfRange { col, .. } => *col,
        }
    }
}
