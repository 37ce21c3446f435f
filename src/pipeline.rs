//! Front-to-back driver: source text to optimized IR and object bytes.

use thiserror::Error;
use tracing::info;

use crate::bytecode::compile::generate;
use crate::bytecode::object;
use crate::bytecode::optimize::optimize;
use crate::bytecode::{EncodeError, IrInstruction};
use crate::frontend::lexer::{Lexer, LexerError};
use crate::frontend::parser::Parser;
use crate::frontend::parser_error::ParserError;
use crate::frontend::token::Token;
use crate::lang::block::Block;
use crate::lang::tree::TreeNode;
use crate::lang::vlsm::{self, SubnetRecord, VlsmError};
use crate::semantic::{self, SemanticError};

/// One reported problem from any of the accumulating stages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("lexical error: {0}")]
    Lex(#[from] LexerError),

    #[error("syntax error: {0}")]
    Syntax(#[from] ParserError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),
}

/// Every diagnostic of a run, in stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} error(s) found", .0.len())]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("refusing to build an object: {0}")]
    Diagnostics(Diagnostics),

    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub trees: Vec<TreeNode>,
    /// Every block the parser accepted, valid or not.
    pub blocks: Vec<Block>,
    /// Blocks that also passed semantic analysis.
    pub valid_blocks: Vec<Block>,
    pub diagnostics: Diagnostics,
    pub ir: Vec<IrInstruction>,
    pub optimized: Vec<IrInstruction>,
}

impl Compilation {
    /// Encodes the optimized IR. Refused while any diagnostic is present.
    pub fn object(&self) -> Result<Vec<u8>, CompileError> {
        if !self.diagnostics.is_empty() {
            return Err(CompileError::Diagnostics(self.diagnostics.clone()));
        }
        Ok(object::encode(&self.optimized)?)
    }

    /// Allocation results for every valid block, in source order.
    pub fn subnets(&self) -> Result<Vec<SubnetRecord>, VlsmError> {
        let mut records = Vec::new();
        for block in &self.valid_blocks {
            // Semantic analysis already checked both parse.
            let Ok(ip) = block.ip_address.parse() else {
                continue;
            };
            let Some(prefix) = block
                .subnet_mask
                .strip_prefix('/')
                .and_then(|p| p.parse().ok())
            else {
                continue;
            };
            records.extend(vlsm::allocate(
                ip,
                prefix,
                &block.num_hosts,
                block.name.as_deref(),
            )?);
        }
        Ok(records)
    }
}

/// Runs lex, parse, analyze, generate and optimize over `source`.
///
/// Later stages run on whatever earlier stages recovered, so one bad
/// statement does not hide problems in the others.
pub fn compile(source: &str) -> Compilation {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    let parsed = Parser::new(tokens.clone()).parse();
    let analysis = semantic::analyze(&parsed.blocks);

    let ir = generate(&analysis.valid);
    let optimized = optimize(ir.clone());

    let mut diagnostics = Diagnostics::default();
    diagnostics.0.extend(lex_errors.into_iter().map(Diagnostic::from));
    diagnostics.0.extend(parsed.errors.into_iter().map(Diagnostic::from));
    diagnostics.0.extend(analysis.errors.into_iter().map(Diagnostic::from));

    info!(
        tokens = tokens.len(),
        blocks = parsed.blocks.len(),
        diagnostics = diagnostics.len(),
        instructions = optimized.len(),
        "compilation finished"
    );

    Compilation {
        tokens,
        trees: parsed.trees,
        blocks: parsed.blocks,
        valid_blocks: analysis.valid,
        diagnostics,
        ir,
        optimized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::object::{MAGIC, decode};
    use crate::bytecode::{DecodeError, Opcode, Operand};
    use crate::runtime::{Vm, VmConfig};
    use crate::semantic::SemanticErrorKind;

    const OFICINA: &str = "IP 192.168.1.0 MASK /24 HOSTS 50,20 NAME Oficina;";

    #[test]
    fn test_oficina_end_to_end() {
        let c = compile(OFICINA);
        assert!(c.diagnostics.is_empty(), "{:?}", c.diagnostics);

        let expected = vec![
            IrInstruction::begin_block("Oficina"),
            IrInstruction::set_ip("192.168.1.0"),
            IrInstruction::set_mask("/24"),
            IrInstruction::alloc_subnet(50, "Oficina", "Oficina_sub1"),
            IrInstruction::alloc_subnet(20, "Oficina", "Oficina_sub2"),
            IrInstruction::end_block("Oficina"),
        ];
        assert_eq!(c.ir, expected);
        assert_eq!(c.optimized, expected);

        let bytes = c.object().unwrap();
        assert_eq!(decode(&bytes).unwrap().to_ir().unwrap(), expected);
    }

    #[test]
    fn test_golden_trace() {
        let src = "\
IP 192.168.1.0 MASK /24 HOSTS 50,20 NAME Oficina;
IP 10.0.0.0 MASK /16 HOSTS 500;
";
        let bytes = compile(src).object().unwrap();
        let trace = Vm::load_with_config(&bytes, VmConfig::default())
            .unwrap()
            .run();

        let expected = "\
=== VM START (11 instructions) ===
[BEGIN_BLOCK] name=Oficina
[SET_IP] ip=192.168.1.0
[SET_MASK] mask=/24
[ALLOC_SUBNET] hosts=50 block=Oficina label=Oficina_sub1
[ALLOC_SUBNET] hosts=20 block=Oficina label=Oficina_sub2
[END_BLOCK] name=Oficina
[BEGIN_BLOCK] name=block2
[SET_IP] ip=10.0.0.0
[SET_MASK] mask=/16
[ALLOC_SUBNET] hosts=500 block=block2 label=block2_sub1
[END_BLOCK] name=block2
=== VM END ===";
        assert_eq!(trace.join("\n"), expected);
    }

    #[test]
    fn test_round_trip_many_blocks() {
        let src = "\
IP 10.0.0.0 MASK /8 HOSTS 1000,200,3 NAME Core;
IP 172.16.0.0 MASK /16 HOSTS 60,60,60 NAME Lab;
IP 192.168.0.0 MASK /24 HOSTS 2;
";
        let c = compile(src);
        assert!(c.diagnostics.is_empty());
        let lifted = decode(&c.object().unwrap()).unwrap().to_ir().unwrap();
        assert_eq!(lifted, c.optimized);
    }

    #[test]
    fn test_equal_consecutive_host_counts_are_collapsed() {
        let c = compile("IP 172.16.0.0 MASK /16 HOSTS 60,60,30 NAME Lab;");
        assert_eq!(c.ir.len(), 7);
        assert_eq!(c.optimized.len(), 6);
        let allocs: Vec<&IrInstruction> = c
            .optimized
            .iter()
            .filter(|i| i.opcode == Opcode::AllocSubnet)
            .collect();
        assert_eq!(allocs.len(), 2);
        assert_eq!(allocs[1].result, Operand::Str("Lab_sub3".to_string()));
    }

    #[test]
    fn test_lexer_gating_reported() {
        let c = compile("IP 10.0.0.0 MASK /8 HOSTS Oficina 5;");
        let lex: Vec<&Diagnostic> = c
            .diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::Lex(_)))
            .collect();
        assert_eq!(lex.len(), 1);
        // The identifier was dropped, so the statement itself still parses.
        assert_eq!(c.blocks.len(), 1);
        assert!(c.object().is_err());
    }

    #[test]
    fn test_errors_from_every_stage_accumulate() {
        let src = "\
IP 10.0.0.0 HOSTS 10;
IP 10.0.0.5 MASK /24 HOSTS 10 NAME Bad;
IP 10.1.0.0 MASK /24 HOSTS 10 NAME Good;
Stray
";
        let c = compile(src);
        let kinds: Vec<&str> = c
            .diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::Lex(_) => "lex",
                Diagnostic::Syntax(_) => "syntax",
                Diagnostic::Semantic(_) => "semantic",
            })
            .collect();
        assert_eq!(kinds, vec!["lex", "syntax", "semantic"]);

        assert!(matches!(
            &c.diagnostics.0[2],
            Diagnostic::Semantic(e) if matches!(e.kind, SemanticErrorKind::NotNetworkAddress { .. })
        ));

        // The good block is still lowered.
        assert_eq!(c.valid_blocks.len(), 1);
        assert_eq!(c.ir[0], IrInstruction::begin_block("Good"));

        match c.object() {
            Err(CompileError::Diagnostics(d)) => assert_eq!(d.len(), 3),
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_magic_never_reaches_vm() {
        let mut bytes = compile(OFICINA).object().unwrap();
        assert_eq!(&bytes[..7], MAGIC);
        bytes[3] = b'!';
        assert!(matches!(Vm::load(&bytes), Err(DecodeError::BadMagic)));
    }

    #[test]
    fn test_subnets_for_valid_blocks() {
        let c = compile(OFICINA);
        let records = c.subnets().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].network.to_string(), "192.168.1.0");
        assert_eq!(records[1].network.to_string(), "192.168.1.64");
    }

    #[test]
    fn test_empty_source() {
        let c = compile("");
        assert!(c.diagnostics.is_empty());
        assert!(c.optimized.is_empty());
        let trace = Vm::load(&c.object().unwrap()).unwrap().run();
        assert_eq!(trace.len(), 2);
    }
}
