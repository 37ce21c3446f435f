//! Presentation backends.
//!
//! Every backend implements [`Renderer`] and accepts either allocation
//! results or IR. Nothing in the compiler depends on this module.

pub mod listing;
pub mod router;

use serde::Serialize;
use thiserror::Error;

use crate::bytecode::IrInstruction;
use crate::lang::vlsm::{SubnetRecord, VlsmError};

pub use listing::Listing;
pub use router::RouterConfig;

/// What a renderer is asked to present.
#[derive(Debug, Clone, Copy)]
pub enum RenderInput<'a> {
    Subnets(&'a [SubnetRecord]),
    Ir(&'a [IrInstruction]),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate subnets for '{block}': {source}")]
    Allocation {
        block: String,
        #[source]
        source: VlsmError,
    },

    #[error("instruction {position}: {reason}")]
    MalformedIr { position: usize, reason: String },

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Renderer {
    fn render(&self, input: RenderInput<'_>) -> Result<String, RenderError>;
}

/// Pretty-printed JSON for any stage output: tokens, derivation trees, IR
/// or allocation records.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::IrInstruction;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use crate::lang::vlsm::allocate;

    fn to_value<T: Serialize + ?Sized>(v: &T) -> serde_json::Value {
        serde_json::from_str(&json(v).unwrap()).unwrap()
    }

    #[test]
    fn test_subnets_json() {
        let records = allocate("10.0.0.0".parse().unwrap(), 24, &[10], Some("Lab")).unwrap();
        let value = to_value(&records[..]);

        assert_eq!(value[0]["requested_hosts"], 10);
        assert_eq!(value[0]["usable_hosts"], 14);
        assert_eq!(value[0]["network"], "10.0.0.0");
        assert_eq!(value[0]["mask"], "255.255.255.240");
        assert_eq!(value[0]["network_name"], "Lab");
    }

    #[test]
    fn test_tokens_json_uses_kind_names() {
        let (tokens, _) = Lexer::new("IP 10.0.0.0 MASK /8").tokenize();
        let value = to_value(&tokens[..]);

        assert_eq!(value[0]["kind"], "IP");
        assert_eq!(value[1]["kind"], "IP_ADDRESS");
        assert_eq!(value[1]["lexeme"], "10.0.0.0");
        assert_eq!(value[3]["kind"], "SUBNET_MASK");
        assert_eq!(value[3]["span"]["col"], 17);
    }

    #[test]
    fn test_ir_json_operands() {
        let ir = vec![
            IrInstruction::begin_block("Lab"),
            IrInstruction::alloc_subnet(10, "Lab", "Lab_sub1"),
        ];
        let value = to_value(&ir[..]);

        assert_eq!(value[0]["opcode"], "BEGIN_BLOCK");
        assert_eq!(value[0]["operand1"], "Lab");
        assert!(value[0]["operand2"].is_null());
        assert_eq!(value[1]["opcode"], "ALLOC_SUBNET");
        assert_eq!(value[1]["operand1"], 10);
        assert_eq!(value[1]["result"], "Lab_sub1");
    }

    #[test]
    fn test_tree_json() {
        let (tokens, _) = Lexer::new("IP 10.0.0.0 MASK /8 HOSTS 4 NAME Lab;").tokenize();
        let out = Parser::new(tokens).parse();
        let value = to_value(&out.trees[..]);

        assert_eq!(value[0]["node"], "interior");
        assert_eq!(value[0]["label"], "Lab");
        assert_eq!(value[0]["children"][0]["node"], "leaf");
        assert_eq!(value[0]["children"][0]["kind"], "IP");
        assert_eq!(value[0]["children"][0]["value"], "IP");
    }
}
