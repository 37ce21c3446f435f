pub mod compile;
pub mod disasm;
pub mod ir;
pub mod object;
pub mod object_error;
pub mod op;
pub mod optimize;

pub use ir::{IrInstruction, Operand};
pub use object::ObjectFile;
pub use object_error::{DecodeError, EncodeError};
pub use op::Opcode;
