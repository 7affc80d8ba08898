use super::interval::{Interval, Time64};
use super::logical_type::LogicalType;
use rusqlite::types::ValueRef;
use std::fmt;

/// A single materialized cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Time64(Time64),
    Interval(Interval),
}

impl Value {
    /// Read an engine value, interpreting it according to the column's logical type.
    ///
    /// Interval columns accept the 16-byte engine blob, a bare integer of
    /// microseconds, or interval text; anything else is passed through as-is.
    pub fn from_engine(value: ValueRef<'_>, logical_type: LogicalType) -> Value {
        match (value, logical_type) {
            (ValueRef::Null, _) => Value::Null,
            (ValueRef::Blob(b), LogicalType::Interval) => match Interval::from_bytes(b) {
                Some(interval) => Value::Interval(interval),
                None => Value::Blob(b.to_vec()),
            },
            (ValueRef::Integer(i), LogicalType::Interval) => Value::Interval(Interval::from_micros(i)),
            (ValueRef::Text(t), LogicalType::Interval) => {
                let text = String::from_utf8_lossy(t);
                match Interval::parse(&text) {
                    Some(interval) => Value::Interval(interval),
                    None => Value::Text(text.into_owned()),
                }
            }
            (ValueRef::Integer(i), _) => Value::Integer(i),
            (ValueRef::Real(f), _) => Value::Real(f),
            (ValueRef::Text(t), _) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            (ValueRef::Blob(b), _) => Value::Blob(b.to_vec()),
        }
    }

    /// The logical type this value naturally carries
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Value::Null => LogicalType::Null,
            Value::Integer(_) => LogicalType::Integer,
            Value::Real(_) => LogicalType::Real,
            Value::Text(_) => LogicalType::Text,
            Value::Blob(_) => LogicalType::Blob,
            Value::Time64(_) | Value::Interval(_) => LogicalType::Interval,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_time64(&self) -> Option<Time64> {
        match self {
            Value::Time64(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<Interval> {
        match self {
            Value::Interval(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(b) => {
                f.write_str("\\x")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Time64(t) => write!(f, "{t}"),
            Value::Interval(i) => write!(f, "{i}"),
        }
    }
}
