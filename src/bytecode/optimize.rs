use tracing::debug;

use crate::bytecode::{IrInstruction, Opcode};

/// Single forward peephole pass.
///
/// - An instruction with the same opcode and first operand as the last
///   retained one is dropped.
/// - An `END_BLOCK x` whose last retained instruction is `BEGIN_BLOCK x`
///   removes both.
///
/// Surviving instructions keep their relative order.
///
/// The duplicate rule looks only at opcode and first operand, so
/// `ALLOC_SUBNET 20, .., net_sub1` followed by `ALLOC_SUBNET 20, .., net_sub2`
/// loses the second allocation.
pub fn optimize(ir: Vec<IrInstruction>) -> Vec<IrInstruction> {
    let before = ir.len();
    let mut out: Vec<IrInstruction> = Vec::with_capacity(before);

    for instr in ir {
        if let Some(last) = out.last() {
            if last.opcode == instr.opcode && last.operand1 == instr.operand1 {
                continue;
            }

            if instr.opcode == Opcode::EndBlock
                && last.opcode == Opcode::BeginBlock
                && last.operand1 == instr.operand1
            {
                out.pop();
                continue;
            }
        }

        out.push(instr);
    }

    debug!(before, after = out.len(), "peephole pass finished");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile::generate;
    use crate::frontend::token::Span;
    use crate::lang::block::Block;

    #[test]
    fn test_duplicate_begin_collapses() {
        let ir = vec![
            IrInstruction::begin_block("Net1"),
            IrInstruction::begin_block("Net1"),
            IrInstruction::set_ip("10.0.0.0"),
        ];
        assert_eq!(
            optimize(ir),
            vec![
                IrInstruction::begin_block("Net1"),
                IrInstruction::set_ip("10.0.0.0"),
            ]
        );
    }

    #[test]
    fn test_empty_block_removed() {
        let ir = vec![
            IrInstruction::begin_block("Net1"),
            IrInstruction::end_block("Net1"),
            IrInstruction::begin_block("Net2"),
            IrInstruction::set_ip("10.0.0.0"),
            IrInstruction::end_block("Net2"),
        ];
        assert_eq!(
            optimize(ir),
            vec![
                IrInstruction::begin_block("Net2"),
                IrInstruction::set_ip("10.0.0.0"),
                IrInstruction::end_block("Net2"),
            ]
        );
    }

    #[test]
    fn test_begin_end_with_different_names_kept() {
        let ir = vec![
            IrInstruction::begin_block("A"),
            IrInstruction::end_block("B"),
        ];
        assert_eq!(optimize(ir.clone()), ir);
    }

    #[test]
    fn test_collapse_exposes_earlier_instruction() {
        // After the empty block goes, the next SET_IP is compared with the
        // SET_IP that is now last in the output.
        let ir = vec![
            IrInstruction::set_ip("10.0.0.0"),
            IrInstruction::begin_block("X"),
            IrInstruction::end_block("X"),
            IrInstruction::set_ip("10.0.0.0"),
        ];
        assert_eq!(optimize(ir), vec![IrInstruction::set_ip("10.0.0.0")]);
    }

    #[test]
    fn test_same_opcode_different_operand_kept() {
        let ir = vec![
            IrInstruction::alloc_subnet(50, "N", "N_sub1"),
            IrInstruction::alloc_subnet(20, "N", "N_sub2"),
        ];
        assert_eq!(optimize(ir.clone()), ir);
    }

    #[test]
    fn test_equal_host_counts_collapse() {
        let ir = vec![
            IrInstruction::alloc_subnet(20, "N", "N_sub1"),
            IrInstruction::alloc_subnet(20, "N", "N_sub2"),
        ];
        assert_eq!(optimize(ir), vec![IrInstruction::alloc_subnet(20, "N", "N_sub1")]);
    }

    #[test]
    fn test_generated_block_unchanged() {
        let block = Block {
            ordinal: 1,
            ip_address: "192.168.1.0".to_string(),
            subnet_mask: "/24".to_string(),
            num_hosts: vec![50, 20],
            name: Some("Oficina".to_string()),
            span: Span { line: 1, col: 0 },
        };
        let ir = generate(&[block]);
        assert_eq!(optimize(ir.clone()), ir);
    }
}
