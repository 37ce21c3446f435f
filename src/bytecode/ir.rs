use serde::Serialize;

use crate::bytecode::Opcode;

/// One instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Operand {
    None,
    Int(i64),
    Str(String),
}

impl Operand {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Operand::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Operand::None)
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::None => write!(f, "-"),
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Str(s) => write!(f, "'{}'", s),
        }
    }
}

/// A fixed-shape instruction: opcode plus three operand slots.
///
/// The third slot is called `result` after the role it plays for
/// `ALLOC_SUBNET`, where it names the subnet being produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrInstruction {
    pub opcode: Opcode,
    pub operand1: Operand,
    pub operand2: Operand,
    pub result: Operand,
}

impl IrInstruction {
    pub fn new(opcode: Opcode, operand1: Operand, operand2: Operand, result: Operand) -> Self {
        Self {
            opcode,
            operand1,
            operand2,
            result,
        }
    }

    pub fn begin_block(name: &str) -> Self {
        Self::unary(Opcode::BeginBlock, name)
    }

    pub fn end_block(name: &str) -> Self {
        Self::unary(Opcode::EndBlock, name)
    }

    pub fn set_ip(ip: &str) -> Self {
        Self::unary(Opcode::SetIp, ip)
    }

    pub fn set_mask(mask: &str) -> Self {
        Self::unary(Opcode::SetMask, mask)
    }

    pub fn alloc_subnet(hosts: u32, block: &str, label: &str) -> Self {
        Self::new(
            Opcode::AllocSubnet,
            Operand::Int(i64::from(hosts)),
            Operand::Str(block.to_string()),
            Operand::Str(label.to_string()),
        )
    }

    fn unary(opcode: Opcode, text: &str) -> Self {
        Self::new(
            opcode,
            Operand::Str(text.to_string()),
            Operand::None,
            Operand::None,
        )
    }

    pub fn operands(&self) -> [&Operand; 3] {
        [&self.operand1, &self.operand2, &self.result]
    }
}

impl std::fmt::Display for IrInstruction {
    /// `MNEMONIC op1, op2, result`, omitting trailing empty slots.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ops = self.operands();
        let shown = ops.iter().rposition(|o| !o.is_none()).map_or(0, |i| i + 1);

        write!(f, "{}", self.opcode)?;
        for (i, op) in ops[..shown].iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, op)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(IrInstruction::begin_block("Net1").to_string(), "BEGIN_BLOCK 'Net1'");
        assert_eq!(
            IrInstruction::alloc_subnet(50, "Oficina", "Oficina_sub1").to_string(),
            "ALLOC_SUBNET 50, 'Oficina', 'Oficina_sub1'"
        );
        let bare = IrInstruction::new(Opcode::EndBlock, Operand::None, Operand::None, Operand::None);
        assert_eq!(bare.to_string(), "END_BLOCK");
    }
}
