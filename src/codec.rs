// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tagged-field binary serialization.
//!
//! A message is an ordered list of fields. Every field is written as a varint
//! tag `(index << 3) | wire_type` followed by its value:
//!
//! - [`WireType::Varint`]: 7 bits per byte, low group first, continuation
//!   bit set on every byte except the last. Values are masked to 32 bits
//!   before they are written.
//! - [`WireType::Int64`] / [`WireType::Int32`]: fixed width, little-endian.
//! - [`WireType::String`]: varint length followed by the raw bytes.
//!
//! Field order is preserved in both directions.

use crate::error::{Error, Result};
use core::fmt;

/// The low three bits of a field tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer.
    Varint = 0,
    /// Little-endian 64-bit integer.
    Int64 = 1,
    /// Length-delimited byte string.
    String = 2,
    /// Start of a group. Recognized but never encoded or decoded.
    GroupStart = 3,
    /// End of a group. Recognized but never encoded or decoded.
    GroupEnd = 4,
    /// Little-endian 32-bit integer.
    Int32 = 5,
    /// Reserved tag value 6.
    Reserved6 = 6,
    /// Reserved tag value 7.
    Reserved7 = 7,
}

impl WireType {
    fn from_tag(tag: u64) -> Self {
        match tag & 7 {
            0 => Self::Varint,
            1 => Self::Int64,
            2 => Self::String,
            3 => Self::GroupStart,
            4 => Self::GroupEnd,
            5 => Self::Int32,
            6 => Self::Reserved6,
            _ => Self::Reserved7,
        }
    }

    /// Whether values of this type carry an integer.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Varint | Self::Int64 | Self::Int32)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Varint => "VARINT",
            Self::Int64 => "INT64",
            Self::String => "STRING",
            Self::GroupStart => "GROUPSTART",
            Self::GroupEnd => "GROUPEND",
            Self::Int32 => "INT32",
            Self::Reserved6 => "ERROR1",
            Self::Reserved7 => "ERROR2",
        }
    }
}

/// One field of a [`Message`].
///
/// Integer types use `int_value`, [`WireType::String`] uses `bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field {
    /// Field number. Zero is reserved as the end-of-message marker.
    ///
    /// Must stay below 2^29: the tag `index << 3 | type` is masked to 32 bits
    /// like every varint, so larger indices decode as a different field.
    pub index: u32,
    /// How the value is laid out on the wire.
    pub wire_type: WireType,
    /// Value of an integer field.
    pub int_value: u64,
    /// Value of a byte-string field.
    pub bytes: Vec<u8>,
}

impl Field {
    fn integer(index: u32, wire_type: WireType, value: u64) -> Self {
        Self {
            index,
            wire_type,
            int_value: value,
            bytes: Vec::new(),
        }
    }

    /// A varint field.
    pub fn varint(index: u32, value: u64) -> Self {
        Self::integer(index, WireType::Varint, value)
    }

    /// A fixed 64-bit field.
    pub fn int64(index: u32, value: u64) -> Self {
        Self::integer(index, WireType::Int64, value)
    }

    /// A fixed 32-bit field.
    pub fn int32(index: u32, value: u32) -> Self {
        Self::integer(index, WireType::Int32, u64::from(value))
    }

    /// A length-delimited field.
    pub fn bytes(index: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            wire_type: WireType::String,
            int_value: 0,
            bytes: value.into(),
        }
    }

    /// True when every byte of the value is printable ASCII.
    pub fn is_ascii(&self) -> bool {
        self.bytes.iter().all(|b| (0x20..=0x7e).contains(b))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.wire_type.name();
        match self.wire_type {
            WireType::String if self.is_ascii() => {
                // is_ascii guarantees valid UTF-8
                let text = core::str::from_utf8(&self.bytes).map_err(|_| fmt::Error)?;
                write!(f, "{}({}): \"{}\"", self.index, name, text)
            }
            WireType::String => {
                write!(f, "{}({}): h\"{}\"", self.index, name, hex::encode(&self.bytes))
            }
            _ => write!(f, "{}({}): {}", self.index, name, self.int_value),
        }
    }
}

/// An ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    fields: Vec<Field>,
}

impl Message {
    /// An empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Duplicate indices are kept in insertion order.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Append a varint field.
    pub fn put_varint(&mut self, index: u32, value: u64) {
        self.push(Field::varint(index, value));
    }

    /// Append a fixed 64-bit field.
    pub fn put_int64(&mut self, index: u32, value: u64) {
        self.push(Field::int64(index, value));
    }

    /// Append a fixed 32-bit field.
    pub fn put_int32(&mut self, index: u32, value: u32) {
        self.push(Field::int32(index, value));
    }

    /// Append a byte-string field.
    pub fn put_bytes(&mut self, index: u32, value: impl Into<Vec<u8>>) {
        self.push(Field::bytes(index, value));
    }

    /// Append a UTF-8 string field.
    pub fn put_str(&mut self, index: u32, value: &str) {
        self.push(Field::bytes(index, value.as_bytes()));
    }

    /// The fields in insertion order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the message has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field with the given index.
    pub fn get(&self, index: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.index == index)
    }

    /// Integer value of the first field with `index`, if present.
    pub fn get_int(&self, index: u32) -> Result<Option<u64>> {
        match self.get(index) {
            None => Ok(None),
            Some(f) if f.wire_type.is_integer() => Ok(Some(f.int_value)),
            Some(_) => Err(Error::malformed("field is not an integer")),
        }
    }

    /// Byte value of the first field with `index`, if present.
    pub fn get_bytes(&self, index: u32) -> Result<Option<&[u8]>> {
        match self.get(index) {
            None => Ok(None),
            Some(f) if f.wire_type == WireType::String => Ok(Some(&f.bytes)),
            Some(_) => Err(Error::malformed("field is not a string")),
        }
    }

    /// UTF-8 value of the first field with `index`, if present.
    pub fn get_str(&self, index: u32) -> Result<Option<&str>> {
        match self.get_bytes(index)? {
            None => Ok(None),
            Some(b) => core::str::from_utf8(b)
                .map(Some)
                .map_err(|_| Error::malformed("string field is not UTF-8")),
        }
    }

    /// Serialize all fields in order.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut w = Writer::default();
        for field in &self.fields {
            w.write_varint((u64::from(field.index) << 3) | field.wire_type as u64);
            match field.wire_type {
                WireType::Varint => w.write_varint(field.int_value),
                WireType::Int64 => w.write_int64(field.int_value),
                #[allow(clippy::cast_possible_truncation)]
                WireType::Int32 => w.write_int32(field.int_value as u32),
                WireType::String => w.write_bytes(&field.bytes),
                other => return Err(Error::UnsupportedFieldType(other)),
            }
        }
        Ok(w.into_inner())
    }

    /// Parse a serialized message.
    ///
    /// A tag with index zero ends the message; anything after it is ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let mut msg = Self::new();
        while !r.is_empty() {
            let tag = r.read_varint()?;
            let index = u32::try_from(tag >> 3)
                .map_err(|_| Error::malformed("field index out of range"))?;
            if index == 0 {
                break;
            }
            let field = match WireType::from_tag(tag) {
                WireType::Varint => Field::varint(index, r.read_varint()?),
                WireType::Int64 => Field::int64(index, r.read_int64()?),
                WireType::Int32 => Field::int32(index, r.read_int32()?),
                WireType::String => Field::bytes(index, r.read_bytes()?),
                _ => return Err(Error::malformed("unexpected field type")),
            };
            msg.push(field);
        }
        Ok(msg)
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Field;
    type IntoIter = core::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<Field> for Message {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Append-only output buffer.
#[derive(Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Write `value & 0xFFFF_FFFF` as a varint.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn write_varint(&mut self, value: u64) {
        let mut v = value & 0xFFFF_FFFF;
        while v >= 0x80 {
            self.buf.push((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        self.buf.push(v as u8);
    }

    pub(crate) fn write_int64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_int32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, value: &[u8]) {
        self.write_varint(value.len() as u64);
        self.buf.extend_from_slice(value);
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over an input buffer. Every read is bounds checked.
#[derive(Debug)]
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::malformed("truncated input"))?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.take(1)?[0];
            if shift >= 64 {
                return Err(Error::malformed("varint too long"));
            }
            value |= u64::from(b & 0x7f) << shift;
            if b < 0x80 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn read_int64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    fn read_int32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = usize::try_from(self.read_varint()?)
            .map_err(|_| Error::malformed("length out of range"))?;
        self.take(len)
    }
}
