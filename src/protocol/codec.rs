//! Avro Binary Codec
//!
//! Encode `WireValue` ke Avro binary sesuai schema, dan sebaliknya.
//! - int/long: zig-zag varint
//! - float/double: little-endian IEEE 754
//! - string: length (long) + UTF-8 bytes
//! - enum: index symbol (int)
//! - union: index branch (long) + value
//! - record: field sesuai urutan schema
//!
//! Codec dipisah lewat trait `SchemaCodec` supaya pipeline tidak terikat
//! ke satu format.

use std::collections::BTreeMap;

use crate::core::{Node, RecordNode, Schema};
use crate::model::WireValue;

/// Varint long maksimal 10 bytes
const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("missing field with no default")]
    MissingField,
    #[error("symbol {0:?} is not part of the enum")]
    UnknownSymbol(String),
    #[error("no union branch accepts {0}")]
    NoUnionBranch(&'static str),
    #[error("value {0} does not fit in an int")]
    IntOverflow(i64),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("malformed varint")]
    InvalidVarint,
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBoolean(u8),
    #[error("negative length {0}")]
    NegativeLength(i64),
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
    #[error("index {index} out of range for {kind}")]
    IndexOutOfRange { kind: &'static str, index: i64 },
    #[error("{0} trailing bytes after datum")]
    TrailingBytes(usize),
    #[error("field `{field}`: {source}")]
    InField {
        field: String,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    fn in_field(self, field: &str) -> Self {
        CodecError::InField {
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}

/// Collaborator yang mengubah mapping primitive <-> bytes
pub trait SchemaCodec {
    /// Encode `value` sesuai `schema`, append ke `out`
    fn encode(&self, schema: &Schema, value: &WireValue, out: &mut Vec<u8>) -> Result<(), CodecError>;

    /// Decode satu datum; seluruh `bytes` harus terpakai
    fn decode(&self, schema: &Schema, bytes: &[u8]) -> Result<WireValue, CodecError>;
}

/// Avro binary encoding (tanpa container file)
#[derive(Debug, Default, Clone, Copy)]
pub struct AvroCodec;

impl SchemaCodec for AvroCodec {
    fn encode(&self, schema: &Schema, value: &WireValue, out: &mut Vec<u8>) -> Result<(), CodecError> {
        write_node(schema.root(), value, out)
    }

    fn decode(&self, schema: &Schema, bytes: &[u8]) -> Result<WireValue, CodecError> {
        let mut reader = Reader::new(bytes);
        let value = read_node(schema.root(), &mut reader)?;
        match reader.remaining() {
            0 => Ok(value),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

#[inline(always)]
fn write_long(n: i64, out: &mut Vec<u8>) {
    // zig-zag
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z >= 0x80 {
        out.push((z as u8) | 0x80);
        z >>= 7;
    }
    out.push(z as u8);
}

#[inline(always)]
fn write_str(s: &str, out: &mut Vec<u8>) {
    write_long(s.len() as i64, out);
    out.extend_from_slice(s.as_bytes());
}

fn mismatch(expected: &'static str, found: &WireValue) -> CodecError {
    CodecError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

fn write_node(node: &Node, value: &WireValue, out: &mut Vec<u8>) -> Result<(), CodecError> {
    match (node, value) {
        (Node::Null, WireValue::Null) => Ok(()),
        (Node::Boolean, WireValue::Boolean(b)) => {
            out.push(u8::from(*b));
            Ok(())
        }
        (Node::Int, WireValue::Long(n)) => {
            let n = i32::try_from(*n).map_err(|_| CodecError::IntOverflow(*n))?;
            write_long(i64::from(n), out);
            Ok(())
        }
        (Node::Long | Node::TimestampMillis, WireValue::Long(n)) => {
            write_long(*n, out);
            Ok(())
        }
        (Node::Float, WireValue::Double(x)) => {
            out.extend_from_slice(&(*x as f32).to_le_bytes());
            Ok(())
        }
        (Node::Double, WireValue::Double(x)) => {
            out.extend_from_slice(&x.to_le_bytes());
            Ok(())
        }
        (Node::String | Node::Uuid, WireValue::String(s)) => {
            write_str(s, out);
            Ok(())
        }
        (Node::Enum(e), WireValue::String(s)) => {
            let index = e
                .index_of(s)
                .ok_or_else(|| CodecError::UnknownSymbol(s.clone()))?;
            write_long(index as i64, out);
            Ok(())
        }
        (Node::Record(r), WireValue::Record(fields)) => write_record(r, fields, out),
        (Node::Union(branches), value) => {
            let index = branches
                .iter()
                .position(|b| accepts(b, value))
                .ok_or(CodecError::NoUnionBranch(value.kind()))?;
            write_long(index as i64, out);
            write_node(&branches[index], value, out)
        }
        (node, value) => Err(mismatch(node.type_name(), value)),
    }
}

fn write_record(
    record: &RecordNode,
    fields: &BTreeMap<String, WireValue>,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    for field in &record.fields {
        let value = fields
            .get(&field.name)
            .or(field.default.as_ref())
            .ok_or_else(|| CodecError::MissingField.in_field(&field.name))?;
        write_node(&field.node, value, out).map_err(|e| e.in_field(&field.name))?;
    }
    Ok(())
}

/// Apakah branch union bisa menampung value ini
fn accepts(node: &Node, value: &WireValue) -> bool {
    match (node, value) {
        (Node::Null, WireValue::Null) => true,
        (Node::Boolean, WireValue::Boolean(_)) => true,
        (Node::Int, WireValue::Long(n)) => i32::try_from(*n).is_ok(),
        (Node::Long | Node::TimestampMillis, WireValue::Long(_)) => true,
        (Node::Float | Node::Double, WireValue::Double(_)) => true,
        (Node::String | Node::Uuid, WireValue::String(_)) => true,
        (Node::Enum(e), WireValue::String(s)) => e.index_of(s).is_some(),
        (Node::Record(_), WireValue::Record(_)) => true,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Cursor zero-copy di atas slice input
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    #[inline(always)]
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline(always)]
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline(always)]
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    #[inline(always)]
    fn read_long(&mut self) -> Result<i64, CodecError> {
        let mut z: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.take(1)?[0];
            z |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(((z >> 1) as i64) ^ -((z & 1) as i64));
            }
        }
        Err(CodecError::InvalidVarint)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        let len = self.read_long()?;
        usize::try_from(len).map_err(|_| CodecError::NegativeLength(len))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| CodecError::InvalidUtf8)
    }

    fn read_index(&mut self, kind: &'static str, len: usize) -> Result<usize, CodecError> {
        let index = self.read_long()?;
        usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(CodecError::IndexOutOfRange { kind, index })
    }
}

fn read_node(node: &Node, reader: &mut Reader<'_>) -> Result<WireValue, CodecError> {
    match node {
        Node::Null => Ok(WireValue::Null),
        Node::Boolean => match reader.take(1)?[0] {
            0 => Ok(WireValue::Boolean(false)),
            1 => Ok(WireValue::Boolean(true)),
            other => Err(CodecError::InvalidBoolean(other)),
        },
        Node::Int => {
            let n = reader.read_long()?;
            i32::try_from(n).map_err(|_| CodecError::IntOverflow(n))?;
            Ok(WireValue::Long(n))
        }
        Node::Long | Node::TimestampMillis => reader.read_long().map(WireValue::Long),
        Node::Float => {
            let bytes = reader.take(4)?;
            let x = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            Ok(WireValue::Double(f64::from(x)))
        }
        Node::Double => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(reader.take(8)?);
            Ok(WireValue::Double(f64::from_le_bytes(raw)))
        }
        Node::String | Node::Uuid => reader.read_string().map(WireValue::String),
        Node::Enum(e) => {
            let index = reader.read_index("enum", e.symbols.len())?;
            Ok(WireValue::String(e.symbols[index].clone()))
        }
        Node::Record(r) => {
            let mut fields = BTreeMap::new();
            for field in &r.fields {
                let value = read_node(&field.node, reader).map_err(|e| e.in_field(&field.name))?;
                fields.insert(field.name.clone(), value);
            }
            Ok(WireValue::Record(fields))
        }
        Node::Union(branches) => {
            let index = reader.read_index("union", branches.len())?;
            read_node(&branches[index], reader)
        }
    }
}
