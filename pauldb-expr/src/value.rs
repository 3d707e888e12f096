use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

/// A dynamically-typed value flowing through PaulDB's schema, codec and
/// expression layers.
///
/// Rather than parameterizing `ColumnType` over a Rust value type, PaulDB
/// keeps a single runtime value representation, the same way
/// `datafusion_common::ScalarValue` stands in for Arrow's per-column native
/// types at the expression-evaluation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Uint16(u16),
    Uint32(u32),
    Float(f64),
    String(String),
    /// Milliseconds since the Unix epoch, used by both `date` and
    /// `timestamp`.
    DateTime(i64),
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Builds a `DateTime` value from a `chrono` instant, truncating to
    /// millisecond precision (the codec's on-disk resolution).
    pub fn from_chrono_datetime(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt.timestamp_millis())
    }

    /// The `chrono` view of a `DateTime` value, or `None` for every other
    /// variant (or for a millisecond count `chrono` can't represent).
    pub fn as_chrono_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(millis) => Utc.timestamp_millis_opt(*millis).single(),
            _ => None,
        }
    }

    /// Best-effort numeric view used by comparison coercion: returns
    /// `Some` for any value that participates in int/float widening.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int16(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::Uint16(v) => Some(*v as f64),
            Value::Uint32(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// True for any of the numeric primitive kinds (int/uint of either
    /// width, or float), used by `Compare`'s coercion rule.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int16(_) | Value::Int32(_) | Value::Uint16(_) | Value::Uint32(_) | Value::Float(_)
        )
    }

    fn is_integral(&self) -> bool {
        matches!(
            self,
            Value::Int16(_) | Value::Int32(_) | Value::Uint16(_) | Value::Uint32(_)
        )
    }

    /// Partial order over values of like kind: strings compare
    /// lexicographically, numbers follow IEEE754 ordering (so `NaN` is
    /// never comparable), and int/float operands are promoted to float
    /// before comparison.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.partial_compare(y) {
                        Some(Ordering::Equal) => continue,
                        other => return other,
                    }
                }
                a.len().partial_cmp(&b.len())
            }
            (a, b) if a.is_integral() && b.is_integral() => match (a, b) {
                (Value::Int32(x), Value::Int32(y)) => x.partial_cmp(y),
                (Value::Uint32(x), Value::Uint32(y)) => x.partial_cmp(y),
                (Value::Int16(x), Value::Int16(y)) => x.partial_cmp(y),
                (Value::Uint16(x), Value::Uint16(y)) => x.partial_cmp(y),
                _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
            },
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Uint16(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "'{v}'"),
            Value::DateTime(millis) => match Utc.timestamp_millis_opt(*millis).single() {
                Some(dt) => write!(f, "{}", dt.to_rfc3339()),
                None => write!(f, "{millis}"),
            },
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_round_trips_through_chrono() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        let value = Value::from_chrono_datetime(dt);
        assert_eq!(value, Value::DateTime(dt.timestamp_millis()));
        assert_eq!(value.as_chrono_datetime(), Some(dt));
    }

    #[test]
    fn datetime_display_uses_rfc3339() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        let value = Value::from_chrono_datetime(dt);
        assert_eq!(value.to_string(), dt.to_rfc3339());
    }
}
