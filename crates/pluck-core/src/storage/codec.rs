//! Row codec for encoding/decoding field values to/from bytes.

use std::collections::HashSet;

use crate::error::Error;
use crate::store::Row;
use crate::value::Value;

/// Type tag for encoded values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTag {
    Null = 0,
    Bool = 1,
    Int32 = 2,
    Int64 = 3,
    Float64 = 4,
    String = 5,
    Bytes = 6,
    Timestamp = 7,
    Uuid = 8,
}

impl TryFrom<u8> for ValueTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ValueTag::Null),
            1 => Ok(ValueTag::Bool),
            2 => Ok(ValueTag::Int32),
            3 => Ok(ValueTag::Int64),
            4 => Ok(ValueTag::Float64),
            5 => Ok(ValueTag::String),
            6 => Ok(ValueTag::Bytes),
            7 => Ok(ValueTag::Timestamp),
            8 => Ok(ValueTag::Uuid),
            _ => Err(Error::InvalidData(format!("unknown value tag: {}", value))),
        }
    }
}

/// Encode a row to bytes.
///
/// Format:
/// - Field count (4 bytes, little-endian)
/// - For each field:
///   - Field name length (2 bytes, little-endian)
///   - Field name (UTF-8 bytes)
///   - Value tag (1 byte)
///   - Value data (variable length, depends on type)
pub fn encode_row(row: &Row) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(row.len() as u32).to_le_bytes());

    for (name, value) in row.fields() {
        let name_bytes = name.as_bytes();
        if name_bytes.len() > u16::MAX as usize {
            return Err(Error::InvalidData("field name too long".into()));
        }
        buf.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        buf.extend_from_slice(name_bytes);
        encode_value(&mut buf, value)?;
    }

    Ok(buf)
}

/// Decode a full row.
pub fn decode_row(data: &[u8]) -> Result<Row, Error> {
    decode_fields(data, None)
}

/// Decode only the named fields of a row; other values are skipped.
pub fn decode_row_projected(data: &[u8], fields: &HashSet<&str>) -> Result<Row, Error> {
    decode_fields(data, Some(fields))
}

fn decode_fields(data: &[u8], wanted: Option<&HashSet<&str>>) -> Result<Row, Error> {
    let mut reader = Reader { data, cursor: 0 };
    let count = u32::from_le_bytes(reader.take_array("field count")?) as usize;
    let mut fields = Vec::with_capacity(count.min(64));

    for _ in 0..count {
        let name_len = u16::from_le_bytes(reader.take_array("field name length")?) as usize;
        let name = std::str::from_utf8(reader.take(name_len, "field name")?)
            .map_err(|_| Error::InvalidData("invalid UTF-8 in field name".into()))?;
        let keep = wanted.map_or(true, |w| w.contains(name));
        let name = name.to_string();

        let value = decode_value(&mut reader)?;
        if keep {
            fields.push((name, value));
        }
    }

    Ok(Row::from_fields(fields))
}

fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), Error> {
    match value {
        Value::Null => buf.push(ValueTag::Null as u8),
        Value::Bool(b) => {
            buf.push(ValueTag::Bool as u8);
            buf.push(u8::from(*b));
        }
        Value::Int32(i) => {
            buf.push(ValueTag::Int32 as u8);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Int64(i) => {
            buf.push(ValueTag::Int64 as u8);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float64(f) => {
            buf.push(ValueTag::Float64 as u8);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::String(s) => {
            buf.push(ValueTag::String as u8);
            write_len_prefixed(buf, s.as_bytes())?;
        }
        Value::Bytes(b) => {
            buf.push(ValueTag::Bytes as u8);
            write_len_prefixed(buf, b)?;
        }
        Value::Timestamp(t) => {
            buf.push(ValueTag::Timestamp as u8);
            buf.extend_from_slice(&t.to_le_bytes());
        }
        Value::Uuid(u) => {
            buf.push(ValueTag::Uuid as u8);
            buf.extend_from_slice(u);
        }
    }
    Ok(())
}

fn write_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<(), Error> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| Error::InvalidData("value too long".into()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn decode_value(reader: &mut Reader<'_>) -> Result<Value, Error> {
    let [tag] = reader.take_array::<1>("value tag")?;
    let value = match ValueTag::try_from(tag)? {
        ValueTag::Null => Value::Null,
        ValueTag::Bool => {
            let [b] = reader.take_array::<1>("bool")?;
            Value::Bool(b != 0)
        }
        ValueTag::Int32 => Value::Int32(i32::from_le_bytes(reader.take_array("int32")?)),
        ValueTag::Int64 => Value::Int64(i64::from_le_bytes(reader.take_array("int64")?)),
        ValueTag::Float64 => Value::Float64(f64::from_le_bytes(reader.take_array("float64")?)),
        ValueTag::String => {
            let len = u32::from_le_bytes(reader.take_array("string length")?) as usize;
            let bytes = reader.take(len, "string")?;
            let s = std::str::from_utf8(bytes)
                .map_err(|_| Error::InvalidData("invalid UTF-8 in string".into()))?;
            Value::String(s.to_string())
        }
        ValueTag::Bytes => {
            let len = u32::from_le_bytes(reader.take_array("bytes length")?) as usize;
            Value::Bytes(reader.take(len, "bytes")?.to_vec())
        }
        ValueTag::Timestamp => {
            Value::Timestamp(i64::from_le_bytes(reader.take_array("timestamp")?))
        }
        ValueTag::Uuid => Value::Uuid(reader.take_array("uuid")?),
    };
    Ok(value)
}

struct Reader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], Error> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| Error::InvalidData(format!("data too short for {}", what)))?;
        let slice = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], Error> {
        let slice = self.take(N, what)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}
