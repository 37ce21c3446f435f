use std::net::Ipv4Addr;

use crate::bytecode::{IrInstruction, Opcode, Operand};
use crate::lang::vlsm::{self, SubnetRecord};
use crate::render::{RenderError, RenderInput, Renderer};

/// Cisco-IOS-style configuration text.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub hostname: String,
    /// Physical interface that carries the dot1Q sub-interfaces built from IR.
    pub interface: String,
    /// Prefix for the numbered interfaces built from allocation results.
    pub interface_prefix: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            hostname: "Router-VLSM".to_string(),
            interface: "GigabitEthernet0/0".to_string(),
            interface_prefix: "GigabitEthernet0/".to_string(),
        }
    }
}

impl Renderer for RouterConfig {
    fn render(&self, input: RenderInput<'_>) -> Result<String, RenderError> {
        match input {
            RenderInput::Subnets(records) => Ok(self.subnet_config(records)),
            RenderInput::Ir(ir) => self.ir_config(ir),
        }
    }
}

/// Parameters of the block currently being folded.
#[derive(Debug, Default)]
struct BlockAcc {
    name: String,
    ip: Option<String>,
    mask: Option<String>,
    hosts: Vec<u32>,
}

/// Fold state threaded through the instruction stream.
#[derive(Debug)]
struct RouterState {
    lines: Vec<String>,
    block: BlockAcc,
    /// dot1Q number for the next sub-interface, shared across blocks.
    next_sub: u32,
}

impl RouterConfig {
    fn subnet_config(&self, records: &[SubnetRecord]) -> String {
        let mut lines = vec![
            "! =======================================".to_string(),
            "! Generated by vlsmc".to_string(),
            format!("hostname {}", self.hostname),
            "! =======================================".to_string(),
        ];

        for (i, subnet) in records.iter().enumerate() {
            let name = subnet
                .network_name
                .clone()
                .unwrap_or_else(|| format!("SUBNET_{}", i));

            lines.push("! -------------------------------".to_string());
            lines.push(format!("! Subnet: {}", name));
            lines.push(format!("! Hosts requested: {}", subnet.requested_hosts));
            lines.push(format!("! Hosts available: {}", subnet.usable_hosts));
            lines.push("! -------------------------------".to_string());
            lines.push(format!("interface {}{}", self.interface_prefix, i));
            lines.push(format!(" description {}", name));
            lines.push(format!(" ip address {} {}", subnet.network, subnet.mask));
            lines.push(" no shutdown".to_string());
            lines.push(" exit".to_string());
        }

        lines.push("! END".to_string());
        join(lines)
    }

    fn ir_config(&self, ir: &[IrInstruction]) -> Result<String, RenderError> {
        let start = RouterState {
            lines: vec![
                "!".to_string(),
                format!("hostname {}", self.hostname),
                "!".to_string(),
            ],
            block: BlockAcc::default(),
            next_sub: 1,
        };

        let mut state = ir
            .iter()
            .enumerate()
            .try_fold(start, |state, (position, instr)| {
                self.apply(state, position, instr)
            })?;

        state.lines.push("!".to_string());
        Ok(join(state.lines))
    }

    fn apply(
        &self,
        mut state: RouterState,
        position: usize,
        instr: &IrInstruction,
    ) -> Result<RouterState, RenderError> {
        match instr.opcode {
            Opcode::BeginBlock => {
                let name = text(position, &instr.operand1, "block name")?;
                state.lines.push(format!("! === NETWORK: {} ===", name));
                state.block = BlockAcc {
                    name: name.to_string(),
                    ..BlockAcc::default()
                };
            }
            Opcode::SetIp => {
                state.block.ip = Some(text(position, &instr.operand1, "IP address")?.to_string());
            }
            Opcode::SetMask => {
                state.block.mask = Some(text(position, &instr.operand1, "mask")?.to_string());
            }
            Opcode::AllocSubnet => {
                let hosts = instr
                    .operand1
                    .as_int()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| malformed(position, "ALLOC_SUBNET needs a host count"))?;
                state.block.hosts.push(hosts);
            }
            Opcode::EndBlock => {
                let block = std::mem::take(&mut state.block);
                if !block.hosts.is_empty() {
                    self.emit_block(&mut state, position, &block)?;
                }
            }
        }

        Ok(state)
    }

    fn emit_block(
        &self,
        state: &mut RouterState,
        position: usize,
        block: &BlockAcc,
    ) -> Result<(), RenderError> {
        let ip: Ipv4Addr = block
            .ip
            .as_deref()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed(position, "block has no valid SET_IP"))?;
        let prefix: u8 = block
            .mask
            .as_deref()
            .and_then(|m| m.strip_prefix('/'))
            .and_then(|m| m.parse().ok())
            .ok_or_else(|| malformed(position, "block has no valid SET_MASK"))?;

        let records = vlsm::allocate(ip, prefix, &block.hosts, Some(&block.name)).map_err(
            |source| RenderError::Allocation {
                block: block.name.clone(),
                source,
            },
        )?;

        for (idx, subnet) in records.iter().enumerate() {
            let n = state.next_sub;
            state.lines.push("!".to_string());
            state.lines.push(format!("interface {}.{}", self.interface, n));
            state
                .lines
                .push(format!(" description {}_sub{}", block.name, idx + 1));
            state.lines.push(format!(" encapsulation dot1Q {}", n));
            state
                .lines
                .push(format!(" ip address {} {}", subnet.first_usable, subnet.mask));
            state.lines.push(" no shutdown".to_string());
            state.lines.push("exit".to_string());
            state.next_sub += 1;
        }

        state.lines.push("!".to_string());
        state.lines.push(format!("interface {}", self.interface));
        state.lines.push(" no shutdown".to_string());
        state.lines.push("exit".to_string());
        Ok(())
    }
}

fn text<'a>(position: usize, op: &'a Operand, what: &str) -> Result<&'a str, RenderError> {
    op.as_str()
        .ok_or_else(|| malformed(position, &format!("expected {} string", what)))
}

fn malformed(position: usize, reason: &str) -> RenderError {
    RenderError::MalformedIr {
        position,
        reason: reason.to_string(),
    }
}

fn join(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_ir(name: &str, ip: &str, mask: &str, hosts: &[u32]) -> Vec<IrInstruction> {
        let mut ir = vec![
            IrInstruction::begin_block(name),
            IrInstruction::set_ip(ip),
            IrInstruction::set_mask(mask),
        ];
        for (i, h) in hosts.iter().enumerate() {
            ir.push(IrInstruction::alloc_subnet(*h, name, &format!("{}_sub{}", name, i + 1)));
        }
        ir.push(IrInstruction::end_block(name));
        ir
    }

    #[test]
    fn test_from_ir() {
        let ir = block_ir("Oficina", "192.168.1.0", "/24", &[20, 50]);
        let text = RouterConfig::default().render(RenderInput::Ir(&ir)).unwrap();

        let expected = "\
!
hostname Router-VLSM
!
! === NETWORK: Oficina ===
!
interface GigabitEthernet0/0.1
 description Oficina_sub1
 encapsulation dot1Q 1
 ip address 192.168.1.1 255.255.255.192
 no shutdown
exit
!
interface GigabitEthernet0/0.2
 description Oficina_sub2
 encapsulation dot1Q 2
 ip address 192.168.1.65 255.255.255.224
 no shutdown
exit
!
interface GigabitEthernet0/0
 no shutdown
exit
!
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_subinterface_numbers_continue_across_blocks() {
        let mut ir = block_ir("A", "10.0.0.0", "/24", &[10]);
        ir.extend(block_ir("B", "10.1.0.0", "/24", &[10, 10]));

        let text = RouterConfig::default().render(RenderInput::Ir(&ir)).unwrap();
        assert!(text.contains("interface GigabitEthernet0/0.1\n description A_sub1"));
        assert!(text.contains("interface GigabitEthernet0/0.2\n description B_sub1"));
        assert!(text.contains("interface GigabitEthernet0/0.3\n description B_sub2"));
        assert!(text.contains(" ip address 10.1.0.17 255.255.255.240"));
    }

    #[test]
    fn test_block_without_hosts_emits_header_only() {
        let ir = vec![
            IrInstruction::begin_block("Empty"),
            IrInstruction::set_ip("10.0.0.0"),
            IrInstruction::end_block("Empty"),
        ];
        let text = RouterConfig::default().render(RenderInput::Ir(&ir)).unwrap();
        assert_eq!(text, "!\nhostname Router-VLSM\n!\n! === NETWORK: Empty ===\n!\n");
    }

    #[test]
    fn test_allocation_failure() {
        let ir = block_ir("Big", "10.0.0.0", "/28", &[100]);
        let err = RouterConfig::default()
            .render(RenderInput::Ir(&ir))
            .unwrap_err();
        assert!(matches!(err, RenderError::Allocation { ref block, .. } if block == "Big"));
    }

    #[test]
    fn test_missing_ip_is_malformed() {
        let ir = vec![
            IrInstruction::begin_block("X"),
            IrInstruction::alloc_subnet(4, "X", "X_sub1"),
            IrInstruction::end_block("X"),
        ];
        let err = RouterConfig::default()
            .render(RenderInput::Ir(&ir))
            .unwrap_err();
        assert!(matches!(err, RenderError::MalformedIr { position: 2, .. }));
    }

    #[test]
    fn test_from_subnets() {
        let records = vlsm::allocate("192.168.0.0".parse().unwrap(), 24, &[10, 100], None).unwrap();
        let config = RouterConfig {
            hostname: "edge".to_string(),
            ..RouterConfig::default()
        };
        let text = config.render(RenderInput::Subnets(&records)).unwrap();

        assert!(text.contains("hostname edge\n"));
        assert!(text.contains("interface GigabitEthernet0/0\n description SUBNET_0\n ip address 192.168.0.0 255.255.255.128\n"));
        assert!(text.contains("interface GigabitEthernet0/1\n description SUBNET_1\n ip address 192.168.0.128 255.255.255.240\n"));
        assert!(text.contains("! Hosts available: 126\n"));
        assert!(text.ends_with("! END\n"));
    }
}
