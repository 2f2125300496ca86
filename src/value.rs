//! Application-side value model
//!
//! `UdtValue` is the object graph callers pass in and receive back:
//! scalars, nested objects keyed by application field name, and
//! collections. `ScalarType` is the closed set of scalar targets the
//! converter can produce; it is computed once per application type at
//! binding time and matched exhaustively afterwards.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single scalar value
///
/// Intervals are carried in plain integer units (day-second intervals as
/// microseconds, year-month intervals as months) and NUMBER values that
/// must stay exact are carried as their decimal string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(String),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<FixedOffset>),
    IntervalDs(i64),
    IntervalYm(i32),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// The target type this value naturally binds as; `None` for null
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Int16(_) => Some(ScalarType::Int16),
            ScalarValue::Int32(_) => Some(ScalarType::Int32),
            ScalarValue::Int64(_) => Some(ScalarType::Int64),
            ScalarValue::Float32(_) => Some(ScalarType::Float32),
            ScalarValue::Float64(_) => Some(ScalarType::Float64),
            ScalarValue::Decimal(_) => Some(ScalarType::Decimal),
            ScalarValue::Text(_) => Some(ScalarType::Text),
            ScalarValue::Bool(_) => Some(ScalarType::Bool),
            ScalarValue::Date(_) => Some(ScalarType::Date),
            ScalarValue::Timestamp(_) => Some(ScalarType::Timestamp),
            ScalarValue::TimestampTz(_) => Some(ScalarType::TimestampTz),
            ScalarValue::IntervalDs(_) => Some(ScalarType::IntervalDs),
            ScalarValue::IntervalYm(_) => Some(ScalarType::IntervalYm),
            ScalarValue::Bytes(_) => Some(ScalarType::Bytes),
        }
    }
}

/// The closed set of scalar target types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    Text,
    Bool,
    Date,
    Timestamp,
    TimestampTz,
    IntervalDs,
    IntervalYm,
    Bytes,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Int16 => "i16",
            ScalarType::Int32 => "i32",
            ScalarType::Int64 => "i64",
            ScalarType::Float32 => "f32",
            ScalarType::Float64 => "f64",
            ScalarType::Decimal => "decimal",
            ScalarType::Text => "text",
            ScalarType::Bool => "bool",
            ScalarType::Date => "date",
            ScalarType::Timestamp => "timestamp",
            ScalarType::TimestampTz => "timestamp with time zone",
            ScalarType::IntervalDs => "interval day to second",
            ScalarType::IntervalYm => "interval year to month",
            ScalarType::Bytes => "bytes",
        };
        write!(f, "{name}")
    }
}

/// An application value graph shaped like a database UDT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UdtValue {
    Null,
    Scalar(ScalarValue),
    Object(BTreeMap<String, UdtValue>),
    Collection(Vec<UdtValue>),
}

impl UdtValue {
    /// Build an object value from `(field, value)` pairs
    pub fn object<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, UdtValue)>,
    {
        UdtValue::Object(fields.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, UdtValue::Null) || matches!(self, UdtValue::Scalar(ScalarValue::Null))
    }

    /// Look up a field of an object value
    pub fn field(&self, name: &str) -> Option<&UdtValue> {
        match self {
            UdtValue::Object(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            UdtValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Elements of a collection value; `Null` reads as an empty slice
    pub fn elements(&self) -> &[UdtValue] {
        match self {
            UdtValue::Collection(elements) => elements,
            _ => &[],
        }
    }
}

impl From<ScalarValue> for UdtValue {
    fn from(scalar: ScalarValue) -> Self {
        UdtValue::Scalar(scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_field_lookup() {
        let value = UdtValue::object([
            ("name".to_string(), ScalarValue::Text("Ann".to_string()).into()),
            ("age".to_string(), ScalarValue::Null.into()),
        ]);
        assert_eq!(
            value.field("name").and_then(UdtValue::as_scalar),
            Some(&ScalarValue::Text("Ann".to_string()))
        );
        assert!(value.field("age").unwrap().is_null());
        assert!(value.field("missing").is_none());
    }

    #[test]
    fn test_collection_elements() {
        let value = UdtValue::Collection(vec![UdtValue::Null, UdtValue::Null]);
        assert_eq!(value.elements().len(), 2);
        assert!(UdtValue::Null.elements().is_empty());
    }
}
