//! `ColumnType` — a named value domain with validation and an optional
//! binary codec, plus the `nullable`/`array` combinators and the
//! SQL type-name registry.
//!
//! `ColumnType` keeps only a runtime descriptor: a name, a validation
//! predicate and an optional codec, closed over a single dynamic [`Value`]
//! representation rather than parameterizing over a compile-time value type.

use std::fmt;
use std::sync::Arc;

use crate::codec::{ArrayCodec, Codec, NullableCodec, PrimitiveCodec};
use crate::value::Value;

/// The shape of a `ColumnType`: either one of the built-in primitives, or a
/// `nullable`/`array` wrapper around another `ColumnType`.
#[derive(Debug, Clone)]
pub enum ColumnTypeKind {
    String,
    Boolean,
    Uint16,
    Uint32,
    Int16,
    Int32,
    Float,
    Date,
    Timestamp,
    /// Auto-incrementing unique uint32; always unique + indexed when used
    /// as a stored column (enforced by `StoredColumn::serial`).
    Serial,
    /// The type of a computed column's output: never persisted, so it
    /// carries no codec.
    Never,
    Nullable(Box<ColumnType>),
    Array(Box<ColumnType>),
}

/// A named value domain: validates candidate values and, for most kinds,
/// knows how to serialize them.
#[derive(Debug, Clone)]
pub struct ColumnType {
    name: String,
    kind: ColumnTypeKind,
}

impl ColumnType {
    fn new(name: impl Into<String>, kind: ColumnTypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn string() -> Self {
        Self::new("string", ColumnTypeKind::String)
    }

    pub fn boolean() -> Self {
        Self::new("boolean", ColumnTypeKind::Boolean)
    }

    pub fn uint16() -> Self {
        Self::new("uint16", ColumnTypeKind::Uint16)
    }

    pub fn uint32() -> Self {
        Self::new("uint32", ColumnTypeKind::Uint32)
    }

    pub fn int16() -> Self {
        Self::new("int16", ColumnTypeKind::Int16)
    }

    pub fn int32() -> Self {
        Self::new("int32", ColumnTypeKind::Int32)
    }

    pub fn float() -> Self {
        Self::new("float", ColumnTypeKind::Float)
    }

    pub fn date() -> Self {
        Self::new("date", ColumnTypeKind::Date)
    }

    pub fn timestamp() -> Self {
        Self::new("timestamp", ColumnTypeKind::Timestamp)
    }

    /// Auto-incrementing unique uint32. Where the actual increment happens
    /// is a storage-layer concern; this codec serializes it exactly like
    /// `uint32`.
    pub fn serial() -> Self {
        Self::new("serial", ColumnTypeKind::Serial)
    }

    /// The output type of a computed column, before a concrete output type
    /// is substituted in. Never has a codec.
    pub fn never() -> Self {
        Self::new("never", ColumnTypeKind::Never)
    }

    /// Wraps `self` so that `null` is also a valid value. The name suffix
    /// `?` is appended to whatever name `self` already carries, so
    /// combinators stack left-to-right in construction order (e.g.
    /// `string?[]?`).
    pub fn nullable(self) -> Self {
        let name = format!("{}?", self.name);
        Self::new(name, ColumnTypeKind::Nullable(Box::new(self)))
    }

    /// Wraps `self` so that an ordered sequence of `self`-typed values is
    /// valid. Name suffix `[]`.
    pub fn array(self) -> Self {
        let name = format!("{}[]", self.name);
        Self::new(name, ColumnTypeKind::Array(Box::new(self)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ColumnTypeKind {
        &self.kind
    }

    /// Returns true when `value` belongs to this type's domain.
    pub fn is_valid(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (ColumnTypeKind::Nullable(_), Value::Null) => true,
            (ColumnTypeKind::Nullable(inner), value) => inner.is_valid(value),
            (ColumnTypeKind::Array(inner), Value::Array(items)) => {
                items.iter().all(|v| inner.is_valid(v))
            }
            (ColumnTypeKind::Array(_), _) => false,
            (ColumnTypeKind::String, Value::String(_)) => true,
            (ColumnTypeKind::Boolean, Value::Bool(_)) => true,
            (ColumnTypeKind::Uint16, Value::Uint16(_)) => true,
            (ColumnTypeKind::Uint32, Value::Uint32(_)) => true,
            (ColumnTypeKind::Int16, Value::Int16(_)) => true,
            (ColumnTypeKind::Int32, Value::Int32(_)) => true,
            (ColumnTypeKind::Float, Value::Float(_)) => true,
            (ColumnTypeKind::Date, Value::DateTime(_)) => true,
            (ColumnTypeKind::Timestamp, Value::DateTime(_)) => true,
            (ColumnTypeKind::Serial, Value::Uint32(_)) => true,
            (ColumnTypeKind::Never, _) => false,
            _ => false,
        }
    }

    /// The codec for this type, or `None` if this type has no binary
    /// representation (only `never` today). A stored column whose
    /// type lacks a codec makes `make_table_schema_struct` return `None`.
    pub fn codec(&self) -> Option<Arc<dyn Codec>> {
        match &self.kind {
            ColumnTypeKind::Never => None,
            ColumnTypeKind::String => Some(Arc::new(PrimitiveCodec::String)),
            ColumnTypeKind::Boolean => Some(Arc::new(PrimitiveCodec::Bool)),
            ColumnTypeKind::Uint16 => Some(Arc::new(PrimitiveCodec::Uint16)),
            ColumnTypeKind::Uint32 | ColumnTypeKind::Serial => {
                Some(Arc::new(PrimitiveCodec::Uint32))
            }
            ColumnTypeKind::Int16 => Some(Arc::new(PrimitiveCodec::Int16)),
            ColumnTypeKind::Int32 => Some(Arc::new(PrimitiveCodec::Int32)),
            ColumnTypeKind::Float => Some(Arc::new(PrimitiveCodec::Float)),
            ColumnTypeKind::Date | ColumnTypeKind::Timestamp => {
                Some(Arc::new(PrimitiveCodec::DateTime))
            }
            ColumnTypeKind::Nullable(inner) => inner
                .codec()
                .map(|inner| Arc::new(NullableCodec { inner }) as Arc<dyn Codec>),
            ColumnTypeKind::Array(inner) => inner
                .codec()
                .map(|inner| Arc::new(ArrayCodec { inner }) as Arc<dyn Codec>),
        }
    }
}

impl PartialEq for ColumnType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parses type names bidirectionally between the SQL dialect's type names
/// (`TEXT`, `INT`, `FLOAT`, each with an optional `[]` suffix) and PaulDB's
/// internal `ColumnType`s, matching CREATE TABLE's column type support
/// matrix.
#[derive(Debug, Default)]
pub struct TypeRegistry;

impl TypeRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Parses a SQL type name such as `TEXT` or `INT[]` into a `ColumnType`.
    pub fn from_sql(&self, sql_name: &str) -> pauldb_common::Result<ColumnType> {
        let (base, is_array) = match sql_name.strip_suffix("[]") {
            Some(base) => (base, true),
            None => (sql_name, false),
        };
        let base_type = match base.to_ascii_uppercase().as_str() {
            "TEXT" => ColumnType::string(),
            "INT" => ColumnType::int32(),
            "FLOAT" => ColumnType::float(),
            other => {
                return pauldb_common::not_impl_err!("unsupported SQL type name: {other}")
            }
        };
        Ok(if is_array {
            base_type.array()
        } else {
            base_type
        })
    }

    /// The reverse of [`TypeRegistry::from_sql`]: renders a `ColumnType`
    /// back to its SQL type name, when it has one. Nested combinators
    /// beyond a single `[]` (e.g. a nullable type) have no SQL spelling in
    /// this dialect and return `None`.
    pub fn to_sql(&self, column_type: &ColumnType) -> Option<String> {
        match column_type.kind() {
            ColumnTypeKind::String => Some("TEXT".to_string()),
            ColumnTypeKind::Int32 => Some("INT".to_string()),
            ColumnTypeKind::Float => Some("FLOAT".to_string()),
            ColumnTypeKind::Array(inner) => self.to_sql(inner).map(|s| format!("{s}[]")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_and_array_stack_suffixes_left_to_right() {
        let t = ColumnType::string().nullable().array().nullable();
        assert_eq!(t.name(), "string?[]?");
    }

    #[test]
    fn nullable_accepts_null_and_inner() {
        let t = ColumnType::int32().nullable();
        assert!(t.is_valid(&Value::Null));
        assert!(t.is_valid(&Value::Int32(5)));
        assert!(!t.is_valid(&Value::String("x".into())));
    }

    #[test]
    fn array_validates_each_element() {
        let t = ColumnType::int32().array();
        assert!(t.is_valid(&Value::Array(vec![Value::Int32(1), Value::Int32(2)])));
        assert!(!t.is_valid(&Value::Array(vec![Value::Int32(1), Value::String("x".into())])));
    }

    #[test]
    fn registry_round_trips_sql_names() {
        let reg = TypeRegistry::new();
        let t = reg.from_sql("INT[]").unwrap();
        assert_eq!(t.name(), "int32[]");
        assert_eq!(reg.to_sql(&t).as_deref(), Some("INT[]"));
    }

    #[test]
    fn never_type_has_no_codec() {
        assert!(ColumnType::never().codec().is_none());
    }
}
