use std::net::Ipv4Addr;

use tracing::debug;

use crate::lang::block::Block;
use crate::lang::vlsm::{self, MAX_PREFIX, MIN_PREFIX};
use crate::semantic::semantic_error::{SemanticError, SemanticErrorKind};

/// Result of checking every parsed block.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Blocks with no semantic errors, in source order.
    pub valid: Vec<Block>,
    pub errors: Vec<SemanticError>,
}

/// Checks every block independently. A bad block never stops the others
/// from being checked.
pub fn analyze(blocks: &[Block]) -> Analysis {
    let mut analysis = Analysis::default();

    for block in blocks {
        let errors = check_block(block);
        if errors.is_empty() {
            analysis.valid.push(block.clone());
        } else {
            analysis.errors.extend(errors);
        }
    }

    debug!(
        blocks = blocks.len(),
        valid = analysis.valid.len(),
        errors = analysis.errors.len(),
        "semantic analysis finished"
    );

    analysis
}

/// Checks one block and returns every problem found.
///
/// Checks run in a fixed order. A malformed address or prefix, an empty
/// host list, or a non-canonical network address ends the checks for the
/// block, since later checks would only report follow-on noise. Zero host
/// counts are reported and checking continues.
pub fn check_block(block: &Block) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    let err = |kind: SemanticErrorKind| SemanticError::new(block, kind);

    let Ok(ip) = block.ip_address.parse::<Ipv4Addr>() else {
        errors.push(err(SemanticErrorKind::InvalidIp(block.ip_address.clone())));
        return errors;
    };

    let Some(prefix) = parse_prefix(&block.subnet_mask) else {
        errors.push(err(SemanticErrorKind::InvalidPrefix(
            block.subnet_mask.clone(),
        )));
        return errors;
    };

    if block.num_hosts.contains(&0) {
        errors.push(err(SemanticErrorKind::ZeroHosts));
    }

    let Some(&largest) = block.num_hosts.iter().max() else {
        errors.push(err(SemanticErrorKind::NoHosts));
        return errors;
    };

    let expected = vlsm::network_address(ip, prefix);
    if expected != ip {
        errors.push(err(SemanticErrorKind::NotNetworkAddress {
            ip,
            prefix,
            expected,
        }));
        return errors;
    }

    let required = 32 - i64::from(vlsm::host_bits(largest));
    if i64::from(prefix) > required {
        errors.push(err(SemanticErrorKind::PrefixTooCoarse {
            prefix,
            hosts: largest,
            required,
        }));
    }

    let needed: u64 = block.num_hosts.iter().map(|h| vlsm::block_size(*h)).sum();
    let available = vlsm::network_size(prefix);
    if needed > available {
        errors.push(err(SemanticErrorKind::CapacityExceeded {
            prefix,
            needed,
            available,
        }));
    }

    errors
}

/// Parses `/n` with n in the accepted prefix range.
fn parse_prefix(text: &str) -> Option<u8> {
    let n = text.strip_prefix('/')?.parse::<u32>().ok()?;
    if (u32::from(MIN_PREFIX)..=u32::from(MAX_PREFIX)).contains(&n) {
        u8::try_from(n).ok()
    } else {
        None
    }
}
