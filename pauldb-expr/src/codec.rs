//! Binary codecs for column values and the record serializer built
//! from them.
//!
//! Every codec is fixed-width except `string` (length-prefixed UTF-8) and
//! the array/nullable combinators, which wrap an inner codec. All
//! multi-byte integers are big-endian.

use std::fmt;
use std::sync::Arc;

use pauldb_common::{internal_err, Result};

use crate::value::Value;

/// Encodes and decodes a single [`Value`] to/from its binary representation.
pub trait Codec: fmt::Debug + Send + Sync {
    /// Appends `value`'s encoding to `out`.
    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()>;

    /// Consumes this codec's encoding from the front of `input`, returning
    /// the decoded value and advancing `input` past the bytes consumed.
    fn decode(&self, input: &mut &[u8]) -> Result<Value>;

    /// The number of bytes `encode` would write for `value`, without
    /// actually writing them. Used by property tests and by callers that
    /// want to preallocate.
    fn size(&self, value: &Value) -> Result<usize> {
        let mut buf = Vec::new();
        self.encode(value, &mut buf)?;
        Ok(buf.len())
    }
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return internal_err!(
            "unexpected end of buffer: wanted {n} bytes, had {}",
            input.len()
        );
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

/// The fixed-width and length-prefixed primitive codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveCodec {
    Bool,
    Int16,
    Int32,
    Uint16,
    Uint32,
    Float,
    String,
    /// Shared by both `date` and `timestamp`: an 8-byte signed
    /// milliseconds-since-epoch integer.
    DateTime,
}

impl Codec for PrimitiveCodec {
    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match (self, value) {
            (PrimitiveCodec::Bool, Value::Bool(v)) => out.push(if *v { 1 } else { 0 }),
            (PrimitiveCodec::Int16, Value::Int16(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (PrimitiveCodec::Int32, Value::Int32(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (PrimitiveCodec::Uint16, Value::Uint16(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (PrimitiveCodec::Uint32, Value::Uint32(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (PrimitiveCodec::Float, Value::Float(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (PrimitiveCodec::String, Value::String(v)) => {
                let bytes = v.as_bytes();
                out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                out.extend_from_slice(bytes);
            }
            (PrimitiveCodec::DateTime, Value::DateTime(v)) => {
                out.extend_from_slice(&v.to_be_bytes())
            }
            (codec, value) => {
                return internal_err!("value {value} is not valid for codec {codec:?}")
            }
        }
        Ok(())
    }

    fn decode(&self, input: &mut &[u8]) -> Result<Value> {
        Ok(match self {
            PrimitiveCodec::Bool => Value::Bool(take(input, 1)?[0] != 0),
            PrimitiveCodec::Int16 => {
                Value::Int16(i16::from_be_bytes(take(input, 2)?.try_into().unwrap()))
            }
            PrimitiveCodec::Int32 => {
                Value::Int32(i32::from_be_bytes(take(input, 4)?.try_into().unwrap()))
            }
            PrimitiveCodec::Uint16 => {
                Value::Uint16(u16::from_be_bytes(take(input, 2)?.try_into().unwrap()))
            }
            PrimitiveCodec::Uint32 => {
                Value::Uint32(u32::from_be_bytes(take(input, 4)?.try_into().unwrap()))
            }
            PrimitiveCodec::Float => {
                Value::Float(f64::from_be_bytes(take(input, 8)?.try_into().unwrap()))
            }
            PrimitiveCodec::String => {
                let len = u32::from_be_bytes(take(input, 4)?.try_into().unwrap()) as usize;
                let bytes = take(input, len)?;
                Value::String(String::from_utf8(bytes.to_vec()).map_err(|e| {
                    pauldb_common::PaulDbError::Internal(format!("invalid utf8 in record: {e}"))
                })?)
            }
            PrimitiveCodec::DateTime => {
                Value::DateTime(i64::from_be_bytes(take(input, 8)?.try_into().unwrap()))
            }
        })
    }
}

/// Prepends a 1-byte tag (0 = null, 1 = present) ahead of the inner codec's
/// output.
#[derive(Debug)]
pub struct NullableCodec {
    pub inner: Arc<dyn Codec>,
}

impl Codec for NullableCodec {
    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match value {
            Value::Null => out.push(0),
            other => {
                out.push(1);
                self.inner.encode(other, out)?;
            }
        }
        Ok(())
    }

    fn decode(&self, input: &mut &[u8]) -> Result<Value> {
        match take(input, 1)?[0] {
            0 => Ok(Value::Null),
            _ => self.inner.decode(input),
        }
    }
}

/// Writes a 4-byte big-endian element count followed by each element's
/// encoding.
#[derive(Debug)]
pub struct ArrayCodec {
    pub inner: Arc<dyn Codec>,
}

impl Codec for ArrayCodec {
    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let Value::Array(items) = value else {
            return internal_err!("value {value} is not an array");
        };
        out.extend_from_slice(&(items.len() as u32).to_be_bytes());
        for item in items {
            self.inner.encode(item, out)?;
        }
        Ok(())
    }

    fn decode(&self, input: &mut &[u8]) -> Result<Value> {
        let count = u32::from_be_bytes(take(input, 4)?.try_into().unwrap());
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(self.inner.decode(input)?);
        }
        Ok(Value::Array(items))
    }
}
