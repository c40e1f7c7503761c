//! Versioned serialization backbone.
//!
//! Every key object serializes as:
//!
//! ```text
//! [ format       (2-byte BE discriminant) ]
//! [ fields       (per-format layout) ]
//! ```
//!
//! where each variable-size field is length-prefixed:
//!
//! ```text
//! [ field length (4-byte BE) ][ field bytes ]
//! ```
//!
//! The discriminant selects the field layout on read; a reader that does
//! not know a discriminant fails with [`Error::Format`] instead of
//! guessing. Two profiles exist: [`Profile::Modern`] writes the current
//! layout, [`Profile::Legacy`] reproduces the previous major version's
//! structure (outer cryptosystem tag on key pairs, per-format default
//! substitution on RSA private keys).
//!
//! The JSON rendition is an object with base64-encoded buffer fields,
//! numeric enum discriminants, and a `type` schema tag.

use crate::error::{Error, Result};

/// Which serialization dialect to speak.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Profile {
    #[default]
    Modern,
    Legacy,
}

/// Layout versions understood by the binary codec.
///
/// Formats 0 and 1 are the previous major version's layouts (they differ
/// only in which option defaults get substituted on read); format 2 is
/// the current one.
pub(crate) const FORMAT_0: u16 = 0;
pub(crate) const FORMAT_1: u16 = 1;
pub(crate) const FORMAT_2: u16 = 2;

impl Profile {
    /// The format discriminant this profile writes.
    pub(crate) fn format(self) -> u16 {
        match self {
            Self::Modern => FORMAT_2,
            Self::Legacy => FORMAT_1,
        }
    }
}

/// Big-endian, length-prefixed wire building blocks.
pub(crate) mod wire {
    use super::{Error, Result};

    pub fn put_u8(out: &mut Vec<u8>, value: u8) {
        out.push(value);
    }

    pub fn put_u16(out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    pub fn put_u32(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    /// 4-byte big-endian length prefix, then the raw bytes.
    pub fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
        // Buffers bigger than 4 GiB do not serialize.
        debug_assert!(u32::try_from(bytes.len()).is_ok());
        put_u32(out, bytes.len() as u32);
        out.extend_from_slice(bytes);
    }

    /// Cursor over a byte slice; every read is bounds-checked and a
    /// truncated input surfaces as a serialization error.
    pub struct Reader<'a> {
        bytes: &'a [u8],
    }

    impl<'a> Reader<'a> {
        pub fn new(bytes: &'a [u8]) -> Self {
            Self { bytes }
        }

        fn take(&mut self, count: usize) -> Result<&'a [u8]> {
            if count > self.bytes.len() {
                return Err(Error::Serialization(
                    "unexpected end of input".to_string(),
                ));
            }
            let (head, tail) = self.bytes.split_at(count);
            self.bytes = tail;
            Ok(head)
        }

        pub fn u8(&mut self) -> Result<u8> {
            Ok(self.take(1)?[0])
        }

        pub fn u16(&mut self) -> Result<u16> {
            let bytes = self.take(2)?;
            Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
        }

        pub fn u32(&mut self) -> Result<u32> {
            let bytes = self.take(4)?;
            Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        }

        pub fn bytes(&mut self) -> Result<&'a [u8]> {
            let length = self.u32()? as usize;
            self.take(length)
        }

        /// Reject trailing garbage.
        pub fn finish(self) -> Result<()> {
            if self.bytes.is_empty() {
                Ok(())
            } else {
                Err(Error::Serialization(format!(
                    "{} trailing bytes after the last field",
                    self.bytes.len()
                )))
            }
        }
    }
}

/// JSON building blocks shared by the key codecs.
pub(crate) mod json {
    use base64::prelude::{BASE64_STANDARD, Engine as _};
    use serde_json::Value;

    use super::{Error, Result};

    pub fn buffer(bytes: &[u8]) -> Value {
        Value::String(BASE64_STANDARD.encode(bytes))
    }

    pub fn parse(text: &str) -> Result<Value> {
        serde_json::from_str(text).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Check the object's `type` schema tag and `format` discriminant.
    pub fn check_schema(object: &Value, schema: &str) -> Result<u16> {
        let tag = get_str(object, "type")?;
        if tag != schema {
            return Err(Error::Serialization(format!(
                "expected a '{schema}' object, got '{tag}'"
            )));
        }
        u16::try_from(get_u64(object, "format")?)
            .map_err(|_| Error::Serialization("format discriminant out of range".to_string()))
    }

    pub fn get_str<'a>(object: &'a Value, field: &str) -> Result<&'a str> {
        object
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Serialization(format!("missing string field '{field}'")))
    }

    pub fn get_u64(object: &Value, field: &str) -> Result<u64> {
        object
            .get(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Serialization(format!("missing integer field '{field}'")))
    }

    pub fn get_u8(object: &Value, field: &str) -> Result<u8> {
        u8::try_from(get_u64(object, field)?)
            .map_err(|_| Error::Serialization(format!("field '{field}' out of range")))
    }

    pub fn get_buffer(object: &Value, field: &str) -> Result<Vec<u8>> {
        BASE64_STANDARD
            .decode(get_str(object, field)?)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        let mut out = Vec::new();
        wire::put_u16(&mut out, 2);
        wire::put_u8(&mut out, 7);
        wire::put_bytes(&mut out, b"hello, world!");

        let mut reader = wire::Reader::new(&out);
        assert_eq!(reader.u16().unwrap(), 2);
        assert_eq!(reader.u8().unwrap(), 7);
        assert_eq!(reader.bytes().unwrap(), b"hello, world!");
        reader.finish().unwrap();
    }

    #[test]
    fn truncated_input_is_a_serialization_error() {
        let mut out = Vec::new();
        wire::put_bytes(&mut out, b"hello, world!");
        out.truncate(out.len() - 1);

        let mut reader = wire::Reader::new(&out);
        assert!(matches!(
            reader.bytes().unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn trailing_bytes_are_a_serialization_error() {
        let mut reader = wire::Reader::new(&[0x00, 0x02, 0xff]);
        assert_eq!(reader.u16().unwrap(), 2);
        assert!(reader.finish().is_err());
    }

    #[test]
    fn profiles_write_distinct_formats() {
        assert_eq!(Profile::Modern.format(), FORMAT_2);
        assert_eq!(Profile::Legacy.format(), FORMAT_1);
    }

    #[test]
    fn json_buffer_roundtrip() {
        let value = json::buffer(b"hello, world!");
        let object = serde_json::json!({ "data": value });

        assert_eq!(json::get_buffer(&object, "data").unwrap(), b"hello, world!");
    }
}
