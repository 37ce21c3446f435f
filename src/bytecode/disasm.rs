use crate::bytecode::object::{EncodedInstruction, EncodedOperand, ObjectFile};
use crate::bytecode::Opcode;

/// Print disassembly of an object file
pub fn print_object(obj: &ObjectFile) {
    print!("{}", disassemble(obj));
}

/// Disassembles an object file: header, string table, then one line per
/// instruction with its byte offset, opcode byte, mnemonic and operands.
pub fn disassemble(obj: &ObjectFile) -> String {
    let rule = "════════════════════════════════════════".to_string();
    let mut lines = vec![
        rule.clone(),
        format!(" VLSMOBJ version {}", obj.version),
        format!(
            " {} strings, {} instructions",
            obj.strings.len(),
            obj.code.len()
        ),
        rule,
    ];

    lines.push("strings:".to_string());
    for (i, s) in obj.strings.iter().enumerate() {
        lines.push(format!("  #{:<4} {:?}", i, s));
    }

    lines.push("code:".to_string());
    for instr in &obj.code {
        lines.push(disassemble_one(obj, instr));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn disassemble_one(obj: &ObjectFile, instr: &EncodedInstruction) -> String {
    let mnemonic = instr.known_opcode().map_or("???", Opcode::mnemonic);
    let operands: Vec<String> = instr
        .operands
        .iter()
        .map(|op| format_operand(obj, *op))
        .collect();

    let mut line = format!(
        "  {:04X}  {:02X}  {:<13} {}",
        instr.offset,
        instr.opcode,
        mnemonic,
        operands.join(", ")
    );

    if let Some(note) = instr.known_opcode().map(effect) {
        line.push_str("  ; ");
        line.push_str(note);
    }

    line.trim_end().to_string()
}

fn format_operand(obj: &ObjectFile, op: EncodedOperand) -> String {
    match op {
        EncodedOperand::None => "-".to_string(),
        EncodedOperand::Int(n) => n.to_string(),
        EncodedOperand::Str(i) => match obj.strings.get(usize::from(i)) {
            Some(s) => format!("#{} {:?}", i, s),
            None => format!("#{} <missing>", i),
        },
    }
}

/// Operand roles for each opcode, shown as a trailing comment.
fn effect(op: Opcode) -> &'static str {
    match op {
        Opcode::BeginBlock => "( block )",
        Opcode::EndBlock => "( block )",
        Opcode::SetIp => "( ip )",
        Opcode::SetMask => "( mask )",
        Opcode::AllocSubnet => "( hosts block label )",
    }
}
