use crate::bytecode::IrInstruction;
use crate::lang::vlsm::SubnetRecord;
use crate::render::{RenderError, RenderInput, Renderer};

/// Assembly-style listing of IR, or a fixed-width allocation table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Listing;

impl Renderer for Listing {
    fn render(&self, input: RenderInput<'_>) -> Result<String, RenderError> {
        Ok(match input {
            RenderInput::Ir(ir) => ir_listing(ir),
            RenderInput::Subnets(records) => subnet_table(records),
        })
    }
}

fn ir_listing(ir: &[IrInstruction]) -> String {
    ir.iter()
        .enumerate()
        .map(|(i, instr)| format!("{:04}: {}\n", i, instr))
        .collect()
}

fn subnet_table(records: &[SubnetRecord]) -> String {
    let mut lines = vec![format!(
        "{:<12} {:>6} {:>8}  {:<18} {:<15}  {:<15}  {:<15}  {:<15}",
        "NAME", "HOSTS", "USABLE", "NETWORK", "MASK", "FIRST", "LAST", "BROADCAST"
    )];

    for r in records {
        let network = format!("{}{}", r.network, r.cidr());
        lines.push(format!(
            "{:<12} {:>6} {:>8}  {:<18} {:<15}  {:<15}  {:<15}  {:<15}",
            r.network_name.as_deref().unwrap_or("-"),
            r.requested_hosts,
            r.usable_hosts,
            network,
            r.mask.to_string(),
            r.first_usable.to_string(),
            r.last_usable.to_string(),
            r.broadcast.to_string(),
        ));
    }

    // Trailing pad on the last column is noise.
    lines
        .iter()
        .map(|l| format!("{}\n", l.trim_end()))
        .collect()
}
