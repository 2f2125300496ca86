//! Driver-native scalar wrapper values
//!
//! `OracleValue` is the shape the collaborator traits speak: one variant
//! per Oracle scalar kind, with NUMBER carried in its exact decimal
//! string form and intervals in plain integer units.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use std::fmt;

/// A driver-native scalar value as read from or bound into a statement
#[derive(Debug, Clone, PartialEq)]
pub enum OracleValue {
    /// Database NULL
    Null,
    /// NUMBER, exact decimal string form
    Number(String),
    /// VARCHAR2 / NVARCHAR2
    Varchar(String),
    /// CHAR / NCHAR
    Char(String),
    /// CLOB / NCLOB payload
    Clob(String),
    /// BLOB payload
    Blob(Vec<u8>),
    /// RAW
    Raw(Vec<u8>),
    /// DATE (no fractional seconds)
    Date(NaiveDateTime),
    /// TIMESTAMP
    Timestamp(NaiveDateTime),
    /// TIMESTAMP WITH TIME ZONE
    TimestampTz(DateTime<FixedOffset>),
    /// INTERVAL DAY TO SECOND, microseconds
    IntervalDs(i64),
    /// INTERVAL YEAR TO MONTH, months
    IntervalYm(i32),
}

impl OracleValue {
    pub fn is_null(&self) -> bool {
        matches!(self, OracleValue::Null)
    }
}

impl fmt::Display for OracleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleValue::Null => write!(f, "null"),
            OracleValue::Number(v) => write!(f, "{v}"),
            OracleValue::Varchar(v) | OracleValue::Char(v) | OracleValue::Clob(v) => {
                write!(f, "{v}")
            }
            OracleValue::Blob(v) | OracleValue::Raw(v) => write!(f, "{} bytes", v.len()),
            OracleValue::Date(v) | OracleValue::Timestamp(v) => write!(f, "{v}"),
            OracleValue::TimestampTz(v) => write!(f, "{v}"),
            OracleValue::IntervalDs(v) => write!(f, "{v} us"),
            OracleValue::IntervalYm(v) => write!(f, "{v} months"),
        }
    }
}
