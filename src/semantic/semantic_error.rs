use std::net::Ipv4Addr;

use thiserror::Error;

use crate::lang::block::Block;

/// What was wrong with a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    #[error("invalid IP address '{0}'")]
    InvalidIp(String),

    #[error("invalid CIDR prefix '{0}' (must be /1 to /30)")]
    InvalidPrefix(String),

    #[error("host counts must be greater than zero")]
    ZeroHosts,

    #[error("no host counts requested")]
    NoHosts,

    #[error("{ip} is not a network address for /{prefix}; did you mean {expected}?")]
    NotNetworkAddress {
        ip: Ipv4Addr,
        prefix: u8,
        expected: Ipv4Addr,
    },

    #[error("/{prefix} is too small for {hosts} hosts (needs /{required} or larger)")]
    PrefixTooCoarse {
        prefix: u8,
        hosts: u32,
        required: i64,
    },

    #[error("subnets need {needed} addresses but the /{prefix} network only has {available}")]
    CapacityExceeded {
        prefix: u8,
        needed: u64,
        available: u64,
    },
}

/// A semantic error tied to the block it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{col}: in {block}: {kind}")]
pub struct SemanticError {
    /// `block 'Name'` for named blocks, `anonymous block` otherwise.
    pub block: String,
    pub line: usize,
    pub col: usize,
    pub kind: SemanticErrorKind,
}

impl SemanticError {
    pub fn new(block: &Block, kind: SemanticErrorKind) -> Self {
        let context = match &block.name {
            Some(name) => format!("block '{}'", name),
            None => "anonymous block".to_string(),
        };

        SemanticError {
            block: context,
            line: block.span.line,
            col: block.span.col,
            kind,
        }
    }
}
