use serde::Serialize;

// =============================================================================
// OPCODE - the instruction set shared by generator, object codec and VM
// =============================================================================

/// One opcode of instruction-set version 1.
///
/// The byte values are part of the object format and must never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    // block structure
    BeginBlock,
    EndBlock,

    // block parameters
    SetIp,
    SetMask,

    // allocation
    AllocSubnet,
}

impl Opcode {
    pub const ALL: [Opcode; 5] = [
        Opcode::BeginBlock,
        Opcode::EndBlock,
        Opcode::SetIp,
        Opcode::SetMask,
        Opcode::AllocSubnet,
    ];

    pub fn byte(self) -> u8 {
        match self {
            Opcode::BeginBlock => 0x01,
            Opcode::EndBlock => 0x02,
            Opcode::SetIp => 0x10,
            Opcode::SetMask => 0x11,
            Opcode::AllocSubnet => 0x12,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Opcode> {
        Opcode::ALL.into_iter().find(|op| op.byte() == byte)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::BeginBlock => "BEGIN_BLOCK",
            Opcode::EndBlock => "END_BLOCK",
            Opcode::SetIp => "SET_IP",
            Opcode::SetMask => "SET_MASK",
            Opcode::AllocSubnet => "ALLOC_SUBNET",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.mnemonic())
    }
}
