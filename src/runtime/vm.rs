use tracing::{debug, trace, warn};

use crate::bytecode::object::{self, EncodedInstruction, EncodedOperand, ObjectFile};
use crate::bytecode::{DecodeError, Opcode};

#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Emit `=== VM START ... ===` / `=== VM END ===` around the trace.
    pub markers: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig { markers: true }
    }
}

/// Replays a decoded object file as a text trace.
///
/// A `Vm` only exists for a successfully decoded object, and [`Vm::run`]
/// consumes it, so every run starts from a fresh load.
pub struct Vm {
    strings: Vec<String>,
    code: Vec<EncodedInstruction>,
    pc: usize,
    config: VmConfig,
}

impl Vm {
    /// Decodes `bytes` and prepares a VM for them.
    pub fn load(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::load_with_config(bytes, VmConfig::default())
    }

    pub fn load_with_config(bytes: &[u8], config: VmConfig) -> Result<Self, DecodeError> {
        let obj = object::decode(bytes)?;
        Ok(Self::from_object(obj, config))
    }

    pub fn from_object(obj: ObjectFile, config: VmConfig) -> Self {
        debug!(instructions = obj.code.len(), "vm loaded");
        Self {
            strings: obj.strings,
            code: obj.code,
            pc: 0,
            config,
        }
    }

    pub fn instruction_count(&self) -> usize {
        self.code.len()
    }

    /// Executes every instruction in order and returns the trace.
    pub fn run(mut self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.code.len() + 2);

        if self.config.markers {
            out.push(format!(
                "=== VM START ({} instructions) ===",
                self.instruction_count()
            ));
        }

        while self.pc < self.code.len() {
            let line = self.step(&self.code[self.pc]);
            trace!(pc = self.pc, "{}", line);
            out.push(line);
            self.pc += 1;
        }

        if self.config.markers {
            out.push("=== VM END ===".to_string());
        }

        out
    }

    fn step(&self, instr: &EncodedInstruction) -> String {
        let [a, b, c] = instr.operands;

        match Opcode::from_byte(instr.opcode) {
            Some(Opcode::BeginBlock) => format!("[BEGIN_BLOCK] name={}", self.text(a)),
            Some(Opcode::EndBlock) => format!("[END_BLOCK] name={}", self.text(a)),
            Some(Opcode::SetIp) => format!("[SET_IP] ip={}", self.text(a)),
            Some(Opcode::SetMask) => format!("[SET_MASK] mask={}", self.text(a)),
            Some(Opcode::AllocSubnet) => format!(
                "[ALLOC_SUBNET] hosts={} block={} label={}",
                self.text(a),
                self.text(b),
                self.text(c)
            ),
            None => {
                warn!(pc = self.pc, "skipping unknown opcode 0x{:02X}", instr.opcode);
                format!("[UNKNOWN] opcode=0x{:02X} (skipped)", instr.opcode)
            }
        }
    }

    /// Operand as trace text: strings unquoted, integers in decimal,
    /// empty operands as nothing.
    fn text(&self, op: EncodedOperand) -> String {
        match op {
            EncodedOperand::None => String::new(),
            EncodedOperand::Int(n) => n.to_string(),
            EncodedOperand::Str(i) => self
                .strings
                .get(usize::from(i))
                .cloned()
                .unwrap_or_default(),
        }
    }
}

/// Convenience: load and run in one call.
pub fn execute(bytes: &[u8], config: VmConfig) -> Result<Vec<String>, DecodeError> {
    Ok(Vm::load_with_config(bytes, config)?.run())
}
