use thiserror::Error;

/// Failure to turn IR into an object file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("too many distinct strings for the string table (limit {limit})")]
    TooManyStrings { limit: usize },

    #[error("string of {len} bytes is longer than the {limit}-byte limit")]
    StringTooLong { len: usize, limit: usize },

    #[error("integer operand {value} of instruction {index} does not fit in 32 bits")]
    IntOutOfRange { index: usize, value: i64 },

    #[error("{count} instructions exceed the object format limit")]
    TooManyInstructions { count: usize },
}

/// Failure to load an object file. Any of these aborts the whole load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("bad magic: not a VLSMOBJ file")]
    BadMagic,

    #[error("unsupported object version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    #[error("truncated object: {what} at byte {offset} runs past the end of the buffer")]
    Truncated { what: &'static str, offset: usize },

    #[error("string {index} in the string table is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("string {index} duplicates an earlier string table entry '{value}'")]
    DuplicateString { index: usize, value: String },

    #[error("unknown operand tag {tag} at byte {offset}")]
    UnknownOperandTag { tag: u8, offset: usize },

    #[error("string index {index} at byte {offset} is out of range (table has {count} strings)")]
    StringIndexOutOfRange {
        index: u16,
        count: usize,
        offset: usize,
    },

    #[error("{count} trailing bytes after the last instruction")]
    TrailingBytes { count: usize },

    #[error("instruction {position} has unknown opcode 0x{byte:02X}")]
    UnknownOpcode { byte: u8, position: usize },
}
