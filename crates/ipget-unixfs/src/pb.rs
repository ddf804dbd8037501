//! # Protobuf Wire Reading
//!
//! dag-pb and the UnixFS envelope are both tiny proto2 messages, decoded
//! here with a minimal wire-format reader rather than generated code.
//! Unknown fields are surfaced to the caller, which skips them; unknown
//! wire types are an error because skipping them safely is impossible.

use ipget_core::varint;
use thiserror::Error;

/// Low-level wire-format errors, wrapped into message-specific decode
/// errors at the call site.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("truncated field")]
    Truncated,

    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),
}

/// A decoded field value.
pub enum PbValue<'a> {
    /// Wire type 0.
    Varint(u64),
    /// Wire type 2: bytes, strings, embedded messages, packed repeats.
    Bytes(&'a [u8]),
    /// Wire types 1 and 5, kept only so unknown fields can be skipped.
    Fixed(u64),
}

/// A cursor over one message's fields.
pub struct PbReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PbReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn read_varint(&mut self) -> Result<u64, WireError> {
        let (value, used) =
            varint::read_u64(&self.buf[self.pos..]).map_err(|_| WireError::Truncated)?;
        self.pos += used;
        Ok(value)
    }

    /// Decode the next `(field number, value)` pair, or `None` at the end
    /// of the message.
    pub fn next_field(&mut self) -> Result<Option<(u64, PbValue<'a>)>, WireError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let key = self.read_varint()?;
        let field = key >> 3;
        let value = match (key & 0x07) as u8 {
            0 => PbValue::Varint(self.read_varint()?),
            1 => PbValue::Fixed(self.read_fixed(8)?),
            2 => {
                let len = self.read_varint()? as usize;
                let end = self
                    .pos
                    .checked_add(len)
                    .filter(|end| *end <= self.buf.len())
                    .ok_or(WireError::Truncated)?;
                let bytes = &self.buf[self.pos..end];
                self.pos = end;
                PbValue::Bytes(bytes)
            }
            5 => PbValue::Fixed(self.read_fixed(4)?),
            other => return Err(WireError::UnsupportedWireType(other)),
        };
        Ok(Some((field, value)))
    }

    fn read_fixed(&mut self, width: usize) -> Result<u64, WireError> {
        let end = self
            .pos
            .checked_add(width)
            .filter(|end| *end <= self.buf.len())
            .ok_or(WireError::Truncated)?;
        let mut value: u64 = 0;
        for (i, &byte) in self.buf[self.pos..end].iter().enumerate() {
            value |= u64::from(byte) << (i * 8);
        }
        self.pos = end;
        Ok(value)
    }
}

/// Decode a packed repeated varint field body.
pub fn read_packed_varints(buf: &[u8]) -> Result<Vec<u64>, WireError> {
    let mut reader = PbReader::new(buf);
    let mut values = Vec::new();
    while reader.pos < buf.len() {
        values.push(reader.read_varint()?);
    }
    Ok(values)
}
