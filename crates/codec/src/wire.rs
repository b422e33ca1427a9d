//! Tagged binary encoding
//!
//! Layout (integers are big-endian):
//!
//! | Tag    | Shape           | Payload                                        |
//! |--------|-----------------|------------------------------------------------|
//! | `0x01` | string          | `u32` byte length, UTF-8 bytes                 |
//! | `0x02` | boolean         | one byte, `0x00` or `0x01`                     |
//! | `0x03` | list of string  | `u32` count, untagged string payloads          |
//! | `0x04` | mapping         | `u32` count, (untagged key, tagged value) pairs |
//! | `0x10` | envelope value  | tagged payload                                 |
//! | `0x11` | envelope empty  | nothing                                        |
//! | `0x12` | envelope error  | untagged string payload                        |
//!
//! There is no null tag: absence only exists as the empty envelope.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::envelope::Envelope;
use crate::error::{DecodeError, Result};
use crate::value::{PropertyEntries, PropertyMap, Value};

/// Maximum nesting of mappings accepted by the decoder.
pub const MAX_DEPTH: usize = 32;

/// Leading byte of every encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// UTF-8 string
    Str = 0x01,
    /// Boolean
    Bool = 0x02,
    /// List of strings
    List = 0x03,
    /// Mapping of string to value
    Map = 0x04,
    /// Envelope holding a value
    Value = 0x10,
    /// Envelope holding nothing
    Empty = 0x11,
    /// Envelope holding an error description
    Error = 0x12,
}

impl Tag {
    /// The wire byte for this tag.
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire byte.
    pub const fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::Str,
            0x02 => Self::Bool,
            0x03 => Self::List,
            0x04 => Self::Map,
            0x10 => Self::Value,
            0x11 => Self::Empty,
            0x12 => Self::Error,
            _ => return None,
        })
    }

    /// Human-readable shape name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Bool => "boolean",
            Self::List => "list",
            Self::Map => "map",
            Self::Value => "envelope(value)",
            Self::Empty => "envelope(empty)",
            Self::Error => "envelope(error)",
        }
    }
}

pub(crate) fn describe_tag(byte: u8) -> String {
    match Tag::from_byte(byte) {
        Some(tag) => format!("{} (0x{byte:02x})", tag.name()),
        None => format!("unknown tag 0x{byte:02x}"),
    }
}

/// A type with a fixed wire shape.
pub trait Wire: Sized {
    /// Append the tagged encoding of `self`.
    fn write(&self, buf: &mut BytesMut);

    /// Read one tagged value of this shape.
    fn read(reader: &mut Reader<'_>) -> Result<Self>;
}

/// Encode a value into a fresh buffer.
pub fn encode<T: Wire>(value: &T) -> Bytes {
    let mut buf = BytesMut::new();
    value.write(&mut buf);
    buf.freeze()
}

/// Decode exactly one value of shape `T`; trailing bytes are an error.
pub fn decode<T: Wire>(bytes: &[u8]) -> Result<T> {
    let mut reader = Reader::new(bytes);
    let value = T::read(&mut reader)?;
    match reader.remaining() {
        0 => Ok(value),
        n => Err(DecodeError::TrailingBytes(n)),
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over an encoded payload.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    depth: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, depth: 0 }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize, context: &'static str) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(DecodeError::Truncated {
                context,
                needed: needed - remaining,
            });
        }
        Ok(())
    }

    /// Read a raw tag byte.
    pub fn tag(&mut self, expected: &'static str) -> Result<u8> {
        self.ensure(1, expected)?;
        Ok(self.buf.get_u8())
    }

    /// Read a tag byte and require it to be `tag`.
    pub fn expect(&mut self, tag: Tag) -> Result<()> {
        let found = self.tag(tag.name())?;
        if found == tag.byte() {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedTag {
                expected: tag.name(),
                found,
            })
        }
    }

    fn length(&mut self, context: &'static str) -> Result<usize> {
        self.ensure(4, context)?;
        Ok(self.buf.get_u32() as usize)
    }

    /// Read an untagged string payload.
    pub fn string(&mut self) -> Result<String> {
        let len = self.length("string length")?;
        self.ensure(len, "string")?;
        let s = std::str::from_utf8(&self.buf[..len])
            .map_err(|_| DecodeError::InvalidUtf8)?
            .to_owned();
        self.buf.advance(len);
        Ok(s)
    }

    /// Read an untagged boolean payload.
    pub fn boolean(&mut self) -> Result<bool> {
        self.ensure(1, "boolean")?;
        match self.buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    /// Read an untagged list-of-string payload.
    pub fn strings(&mut self) -> Result<Vec<String>> {
        let count = self.length("list length")?;
        // Each element needs at least its length prefix.
        let mut items = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            items.push(self.string()?);
        }
        Ok(items)
    }

    /// Read an untagged mapping payload, calling `entry` for each pair.
    fn mapping(
        &mut self,
        mut entry: impl FnMut(&mut Self, String) -> Result<()>,
    ) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::TooDeep { max: MAX_DEPTH });
        }
        self.depth += 1;
        let count = self.length("map length")?;
        for _ in 0..count {
            let key = self.string()?;
            entry(self, key)?;
        }
        self.depth -= 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn put_string(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn put_strings(buf: &mut BytesMut, items: &[String]) {
    buf.put_u32(items.len() as u32);
    for item in items {
        put_string(buf, item);
    }
}

fn put_map(buf: &mut BytesMut, map: &PropertyMap) {
    buf.put_u8(Tag::Map.byte());
    buf.put_u32(map.len() as u32);
    for (key, value) in map {
        put_string(buf, key);
        value.write(buf);
    }
}

fn read_map_body(reader: &mut Reader<'_>) -> Result<PropertyMap> {
    let mut map = PropertyMap::new();
    reader.mapping(|r, key| {
        let value = Value::read(r)?;
        map.insert(key, value);
        Ok(())
    })?;
    Ok(map)
}

// ---------------------------------------------------------------------------
// Wire impls
// ---------------------------------------------------------------------------

impl Wire for String {
    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(Tag::Str.byte());
        put_string(buf, self);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        reader.expect(Tag::Str)?;
        reader.string()
    }
}

impl Wire for bool {
    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(Tag::Bool.byte());
        buf.put_u8(u8::from(*self));
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        reader.expect(Tag::Bool)?;
        reader.boolean()
    }
}

impl Wire for Vec<String> {
    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(Tag::List.byte());
        put_strings(buf, self);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        reader.expect(Tag::List)?;
        reader.strings()
    }
}

impl Wire for PropertyMap {
    fn write(&self, buf: &mut BytesMut) {
        put_map(buf, self);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        reader.expect(Tag::Map)?;
        read_map_body(reader)
    }
}

impl Wire for PropertyEntries {
    fn write(&self, buf: &mut BytesMut) {
        buf.put_u8(Tag::Map.byte());
        buf.put_u32(self.len() as u32);
        for (key, items) in self {
            put_string(buf, key);
            items.write(buf);
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        reader.expect(Tag::Map)?;
        let mut entries = PropertyEntries::new();
        reader.mapping(|r, key| {
            let items = Vec::<String>::read(r)?;
            entries.insert(key, items);
            Ok(())
        })?;
        Ok(entries)
    }
}

impl Wire for Value {
    fn write(&self, buf: &mut BytesMut) {
        match self {
            Self::Str(s) => s.write(buf),
            Self::Bool(b) => b.write(buf),
            Self::List(items) => items.write(buf),
            Self::Map(map) => put_map(buf, map),
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let found = reader.tag("value")?;
        match Tag::from_byte(found) {
            Some(Tag::Str) => reader.string().map(Self::Str),
            Some(Tag::Bool) => reader.boolean().map(Self::Bool),
            Some(Tag::List) => reader.strings().map(Self::List),
            Some(Tag::Map) => read_map_body(reader).map(Self::Map),
            _ => Err(DecodeError::UnexpectedTag {
                expected: "string, boolean, list or map",
                found,
            }),
        }
    }
}

impl<T: Wire> Wire for Envelope<T> {
    fn write(&self, buf: &mut BytesMut) {
        match self {
            Self::Value(v) => {
                buf.put_u8(Tag::Value.byte());
                v.write(buf);
            }
            Self::Empty => buf.put_u8(Tag::Empty.byte()),
            Self::Error(description) => {
                buf.put_u8(Tag::Error.byte());
                put_string(buf, description);
            }
        }
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let found = reader.tag("envelope")?;
        match Tag::from_byte(found) {
            Some(Tag::Value) => T::read(reader).map(Self::Value),
            Some(Tag::Empty) => Ok(Self::Empty),
            Some(Tag::Error) => reader.string().map(Self::Error),
            _ => Err(DecodeError::UnexpectedTag {
                expected: "envelope",
                found,
            }),
        }
    }
}
