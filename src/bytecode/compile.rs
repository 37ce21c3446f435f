use tracing::debug;

use crate::bytecode::IrInstruction;
use crate::lang::block::Block;

/// Lowers validated blocks into IR.
///
/// Each block becomes
///
/// ```text
/// BEGIN_BLOCK name
/// SET_IP      ip
/// SET_MASK    /n
/// ALLOC_SUBNET hosts, name, name_sub<i>    (one per host count, 1-based)
/// END_BLOCK   name
/// ```
///
/// Blocks are lowered independently; nothing carries over between them.
pub fn generate(blocks: &[Block]) -> Vec<IrInstruction> {
    let ir: Vec<IrInstruction> = blocks.iter().flat_map(lower_block).collect();
    debug!(blocks = blocks.len(), instructions = ir.len(), "IR generated");
    ir
}

pub fn lower_block(block: &Block) -> Vec<IrInstruction> {
    let name = block.label();
    let mut ir = Vec::with_capacity(block.num_hosts.len() + 4);

    ir.push(IrInstruction::begin_block(&name));
    ir.push(IrInstruction::set_ip(&block.ip_address));
    ir.push(IrInstruction::set_mask(&block.subnet_mask));

    for (i, hosts) in block.num_hosts.iter().enumerate() {
        let label = format!("{}_sub{}", name, i + 1);
        ir.push(IrInstruction::alloc_subnet(*hosts, &name, &label));
    }

    ir.push(IrInstruction::end_block(&name));
    ir
}
