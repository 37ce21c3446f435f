//! Variable-length subnet allocation.
//!
//! Pure arithmetic over IPv4 networks. The semantic analyzer uses the same
//! sizing helpers so that a block it accepts is always allocatable here.

use std::net::Ipv4Addr;

use serde::Serialize;
use thiserror::Error;

/// Smallest prefix the allocator accepts for a base network.
pub const MIN_PREFIX: u8 = 1;
/// Largest prefix that still leaves usable host addresses.
pub const MAX_PREFIX: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VlsmError {
    #[error("prefix /{0} is outside /1../30")]
    InvalidPrefix(u8),

    #[error("{base} is not the network address for /{prefix} (expected {expected})")]
    NotNetworkAddress {
        base: Ipv4Addr,
        prefix: u8,
        expected: Ipv4Addr,
    },

    #[error("a subnet must request at least one host")]
    ZeroHosts,

    #[error("subnets need {needed} addresses but {network}/{prefix} only has {available}")]
    Exhausted {
        network: Ipv4Addr,
        prefix: u8,
        needed: u64,
        available: u64,
    },
}

/// One allocated subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetRecord {
    pub requested_hosts: u32,
    pub usable_hosts: u64,
    pub network: Ipv4Addr,
    pub prefix: u8,
    pub mask: Ipv4Addr,
    pub first_usable: Ipv4Addr,
    pub last_usable: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub base_ip: Ipv4Addr,
    pub network_name: Option<String>,
}

impl SubnetRecord {
    /// The new prefix in `/n` form.
    pub fn cidr(&self) -> String {
        format!("/{}", self.prefix)
    }
}

/// Host bits needed for `hosts` usable addresses plus network and broadcast:
/// `ceil(log2(hosts + 2))`.
pub fn host_bits(hosts: u32) -> u32 {
    let needed = u64::from(hosts) + 2;
    let mut bits = 0;
    while (1u64 << bits) < needed {
        bits += 1;
    }
    bits
}

/// Addresses consumed by a subnet for `hosts` hosts.
pub fn block_size(hosts: u32) -> u64 {
    1u64 << host_bits(hosts)
}

/// Total addresses in a network with the given prefix.
pub fn network_size(prefix: u8) -> u64 {
    1u64 << (32 - u32::from(prefix.min(32)))
}

/// Netmask for a prefix as a 32-bit value.
pub fn prefix_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p if p >= 32 => u32::MAX,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

/// Canonical network address of `ip` under `prefix`.
pub fn network_address(ip: Ipv4Addr, prefix: u8) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) & prefix_mask(prefix))
}

/// Allocates one subnet per requested host count, largest first, packed
/// contiguously from the start of `base/prefix`.
///
/// The result is deterministic: equal inputs always give equal records.
pub fn allocate(
    base: Ipv4Addr,
    prefix: u8,
    hosts: &[u32],
    name: Option<&str>,
) -> Result<Vec<SubnetRecord>, VlsmError> {
    if !(MIN_PREFIX..=MAX_PREFIX).contains(&prefix) {
        return Err(VlsmError::InvalidPrefix(prefix));
    }

    let expected = network_address(base, prefix);
    if expected != base {
        return Err(VlsmError::NotNetworkAddress {
            base,
            prefix,
            expected,
        });
    }

    if hosts.contains(&0) {
        return Err(VlsmError::ZeroHosts);
    }

    let available = network_size(prefix);
    let needed: u64 = hosts.iter().map(|h| block_size(*h)).sum();
    if needed > available {
        return Err(VlsmError::Exhausted {
            network: base,
            prefix,
            needed,
            available,
        });
    }

    let mut sorted = hosts.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut cursor = u64::from(u32::from(base));
    let mut records = Vec::with_capacity(sorted.len());

    for requested in sorted {
        let bits = host_bits(requested);
        let size = 1u64 << bits;
        let new_prefix = (32 - bits) as u8;
        let addr = |offset: u64| Ipv4Addr::from((cursor + offset) as u32);

        records.push(SubnetRecord {
            requested_hosts: requested,
            usable_hosts: size - 2,
            network: addr(0),
            prefix: new_prefix,
            mask: Ipv4Addr::from(prefix_mask(new_prefix)),
            first_usable: addr(1),
            last_usable: addr(size - 2),
            broadcast: addr(size - 1),
            base_ip: base,
            network_name: name.map(str::to_string),
        });

        cursor += size;
    }

    Ok(records)
}
