pub mod vm;

pub use vm::{Vm, VmConfig, execute};
