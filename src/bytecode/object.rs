//! The VLSMOBJ binary object format.
//!
//! ## Wire format
//!
//! All multi-byte integers are big-endian.
//!
//! ```text
//! magic         b"VLSMOBJ"
//! version       u8 (= 1)
//! string_count  u16
//!   per string: len u16 | len bytes of UTF-8
//! instr_count   u32
//!   per instr:  opcode u8 | operand x3
//! operand:      tag u8
//!                 0 = none
//!                 1 = i32
//!                 2 = string index u16 (< string_count)
//! ```
//!
//! Strings are interned in first-seen order, so the table never holds the
//! same string twice.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::bytecode::object_error::{DecodeError, EncodeError};
use crate::bytecode::{IrInstruction, Opcode, Operand};

pub const MAGIC: &[u8; 7] = b"VLSMOBJ";
pub const VERSION: u8 = 1;

const TAG_NONE: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_STR: u8 = 2;

/// Smallest encoded instruction: opcode plus three empty operand tags.
const MIN_INSTR_LEN: usize = 4;

const MAX_STRINGS: usize = u16::MAX as usize;
const MAX_STRING_LEN: usize = u16::MAX as usize;

/// An operand as it is stored in the object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedOperand {
    None,
    Int(i32),
    Str(u16),
}

/// One decoded instruction record.
///
/// The opcode is kept as the raw byte so that a file produced by a newer
/// instruction set can still be inspected and run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInstruction {
    /// Byte offset of the opcode within the object file.
    pub offset: usize,
    pub opcode: u8,
    pub operands: [EncodedOperand; 3],
}

impl EncodedInstruction {
    pub fn known_opcode(&self) -> Option<Opcode> {
        Opcode::from_byte(self.opcode)
    }
}

/// A fully validated object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFile {
    pub version: u8,
    pub strings: Vec<String>,
    pub code: Vec<EncodedInstruction>,
}

impl ObjectFile {
    /// Resolves an operand against the string table.
    ///
    /// Indices are checked at decode time, so a miss here means the
    /// `ObjectFile` was built by hand; it resolves to `Operand::None`.
    pub fn operand(&self, op: EncodedOperand) -> Operand {
        match op {
            EncodedOperand::None => Operand::None,
            EncodedOperand::Int(n) => Operand::Int(i64::from(n)),
            EncodedOperand::Str(i) => self
                .strings
                .get(usize::from(i))
                .map_or(Operand::None, |s| Operand::Str(s.clone())),
        }
    }

    /// Lifts the code back to IR. Fails on the first unknown opcode.
    pub fn to_ir(&self) -> Result<Vec<IrInstruction>, DecodeError> {
        self.code
            .iter()
            .enumerate()
            .map(|(position, instr)| {
                let opcode = instr.known_opcode().ok_or(DecodeError::UnknownOpcode {
                    byte: instr.opcode,
                    position,
                })?;
                let [a, b, c] = instr.operands;
                Ok(IrInstruction::new(
                    opcode,
                    self.operand(a),
                    self.operand(b),
                    self.operand(c),
                ))
            })
            .collect()
    }
}

// ── Encoding ────────────────────────────────────────────────────────────────

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    fn operand(&mut self, op: EncodedOperand) {
        match op {
            EncodedOperand::None => self.u8(TAG_NONE),
            EncodedOperand::Int(n) => {
                self.u8(TAG_INT);
                self.i32(n);
            }
            EncodedOperand::Str(i) => {
                self.u8(TAG_STR);
                self.u16(i);
            }
        }
    }
}

/// First-seen-order string interner.
#[derive(Default)]
struct StringTable {
    strings: Vec<String>,
    index: HashMap<String, u16>,
}

impl StringTable {
    fn intern(&mut self, s: &str) -> Result<u16, EncodeError> {
        if let Some(&i) = self.index.get(s) {
            return Ok(i);
        }
        if s.len() > MAX_STRING_LEN {
            return Err(EncodeError::StringTooLong {
                len: s.len(),
                limit: MAX_STRING_LEN,
            });
        }
        let i = u16::try_from(self.strings.len())
            .ok()
            .filter(|i| usize::from(*i) < MAX_STRINGS)
            .ok_or(EncodeError::TooManyStrings { limit: MAX_STRINGS })?;

        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), i);
        Ok(i)
    }
}

/// Builds the object file for an instruction stream.
pub fn assemble(ir: &[IrInstruction]) -> Result<ObjectFile, EncodeError> {
    if u32::try_from(ir.len()).is_err() {
        return Err(EncodeError::TooManyInstructions { count: ir.len() });
    }

    let mut table = StringTable::default();
    let mut code = Vec::with_capacity(ir.len());

    for (index, instr) in ir.iter().enumerate() {
        let mut operands = [EncodedOperand::None; 3];
        for (slot, op) in operands.iter_mut().zip(instr.operands()) {
            *slot = match op {
                Operand::None => EncodedOperand::None,
                Operand::Int(n) => EncodedOperand::Int(
                    i32::try_from(*n)
                        .map_err(|_| EncodeError::IntOutOfRange { index, value: *n })?,
                ),
                Operand::Str(s) => EncodedOperand::Str(table.intern(s)?),
            };
        }
        code.push(EncodedInstruction {
            offset: 0,
            opcode: instr.opcode.byte(),
            operands,
        });
    }

    Ok(ObjectFile {
        version: VERSION,
        strings: table.strings,
        code,
    })
}

/// Serializes an object file. Offsets recorded in `code` are ignored.
pub fn to_bytes(obj: &ObjectFile) -> Result<Vec<u8>, EncodeError> {
    let string_count = u16::try_from(obj.strings.len())
        .map_err(|_| EncodeError::TooManyStrings { limit: MAX_STRINGS })?;
    let instr_count = u32::try_from(obj.code.len()).map_err(|_| {
        EncodeError::TooManyInstructions {
            count: obj.code.len(),
        }
    })?;

    let mut w = Writer::new();
    w.bytes(MAGIC);
    w.u8(obj.version);

    w.u16(string_count);
    for s in &obj.strings {
        let len = u16::try_from(s.len()).map_err(|_| EncodeError::StringTooLong {
            len: s.len(),
            limit: MAX_STRING_LEN,
        })?;
        w.u16(len);
        w.bytes(s.as_bytes());
    }

    w.u32(instr_count);
    for instr in &obj.code {
        w.u8(instr.opcode);
        for op in instr.operands {
            w.operand(op);
        }
    }

    Ok(w.buf)
}

/// Encodes an instruction stream straight to bytes.
pub fn encode(ir: &[IrInstruction]) -> Result<Vec<u8>, EncodeError> {
    let obj = assemble(ir)?;
    let bytes = to_bytes(&obj)?;
    debug!(
        instructions = obj.code.len(),
        strings = obj.strings.len(),
        bytes = bytes.len(),
        "object encoded"
    );
    Ok(bytes)
}

// ── Decoding ────────────────────────────────────────────────────────────────

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                what,
                offset: self.pos,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &'static str) -> Result<u16, DecodeError> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        let b = self.take(4, what)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self, what: &'static str) -> Result<i32, DecodeError> {
        let b = self.take(4, what)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn magic(&mut self) -> Result<(), DecodeError> {
        let n = MAGIC.len().min(self.data.len());
        if self.data[..n] != MAGIC[..n] {
            return Err(DecodeError::BadMagic);
        }
        self.take(MAGIC.len(), "magic")?;
        Ok(())
    }

    fn operand(&mut self, string_count: usize) -> Result<EncodedOperand, DecodeError> {
        let offset = self.pos;
        match self.u8("operand tag")? {
            TAG_NONE => Ok(EncodedOperand::None),
            TAG_INT => Ok(EncodedOperand::Int(self.i32("integer operand")?)),
            TAG_STR => {
                let offset = self.pos;
                let index = self.u16("string index")?;
                if usize::from(index) >= string_count {
                    return Err(DecodeError::StringIndexOutOfRange {
                        index,
                        count: string_count,
                        offset,
                    });
                }
                Ok(EncodedOperand::Str(index))
            }
            tag => Err(DecodeError::UnknownOperandTag { tag, offset }),
        }
    }
}

/// Decodes and validates an object file.
///
/// Returns either a complete `ObjectFile` or the first problem found; there
/// is no partial result.
pub fn decode(data: &[u8]) -> Result<ObjectFile, DecodeError> {
    let mut r = Reader::new(data);

    r.magic()?;
    let version = r.u8("version")?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: version,
            expected: VERSION,
        });
    }

    let string_count = usize::from(r.u16("string count")?);
    let mut strings: Vec<String> = Vec::with_capacity(string_count);
    let mut seen: HashSet<&str> = HashSet::with_capacity(string_count);
    for index in 0..string_count {
        let len = usize::from(r.u16("string length")?);
        let bytes = r.take(len, "string bytes")?;
        let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { index })?;
        if !seen.insert(s) {
            return Err(DecodeError::DuplicateString {
                index,
                value: s.to_string(),
            });
        }
        strings.push(s.to_string());
    }

    let instr_count = r.u32("instruction count")? as usize;
    if instr_count > r.remaining() / MIN_INSTR_LEN {
        return Err(DecodeError::Truncated {
            what: "instructions",
            offset: r.pos,
        });
    }

    let mut code = Vec::with_capacity(instr_count);
    for position in 0..instr_count {
        let offset = r.pos;
        let opcode = r.u8("opcode")?;
        let operands = [
            r.operand(string_count)?,
            r.operand(string_count)?,
            r.operand(string_count)?,
        ];
        if Opcode::from_byte(opcode).is_none() {
            warn!(position, "object contains unknown opcode 0x{:02X}", opcode);
        }
        code.push(EncodedInstruction {
            offset,
            opcode,
            operands,
        });
    }

    if r.remaining() > 0 {
        return Err(DecodeError::TrailingBytes {
            count: r.remaining(),
        });
    }

    debug!(
        instructions = code.len(),
        strings = strings.len(),
        "object decoded"
    );

    Ok(ObjectFile {
        version,
        strings,
        code,
    })
}
