//! Scalar conversion between driver-native wrappers and application
//! values
//!
//! Policy, uniformly applied: a database null becomes `ScalarValue::Null`
//! when the target is nullable and a `Cast` error naming the target when
//! it is not; a wrapper with no branch for the requested target fails
//! with a `Cast` error carrying the wrapper's string form. A wrapper that
//! already matches the requested target is returned unchanged, checked
//! first.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::driver::OracleValue;
use crate::error::{UdtError, UdtResult};
use crate::value::{ScalarType, ScalarValue};

/// Convert a driver-native value into an application scalar
pub fn to_application(
    value: &OracleValue,
    target: ScalarType,
    nullable: bool,
) -> UdtResult<ScalarValue> {
    if value.is_null() {
        return null_result(target, nullable);
    }
    // Identity short-circuit: wrapper kind already matches the target.
    match (value, target) {
        (OracleValue::Varchar(v) | OracleValue::Char(v) | OracleValue::Clob(v), ScalarType::Text) => {
            return Ok(ScalarValue::Text(v.clone()));
        }
        (OracleValue::Number(v), ScalarType::Decimal) => {
            return Ok(ScalarValue::Decimal(v.clone()));
        }
        (OracleValue::Date(v), ScalarType::Date) => return Ok(ScalarValue::Date(*v)),
        (OracleValue::Timestamp(v), ScalarType::Timestamp) => {
            return Ok(ScalarValue::Timestamp(*v));
        }
        (OracleValue::TimestampTz(v), ScalarType::TimestampTz) => {
            return Ok(ScalarValue::TimestampTz(*v));
        }
        (OracleValue::IntervalDs(v), ScalarType::IntervalDs) => {
            return Ok(ScalarValue::IntervalDs(*v));
        }
        (OracleValue::IntervalYm(v), ScalarType::IntervalYm) => {
            return Ok(ScalarValue::IntervalYm(*v));
        }
        (OracleValue::Raw(v) | OracleValue::Blob(v), ScalarType::Bytes) => {
            return Ok(ScalarValue::Bytes(v.clone()));
        }
        _ => {}
    }

    match (value, target) {
        (OracleValue::Number(v), ScalarType::Int16) => parse_number(v, target, ScalarValue::Int16),
        (OracleValue::Number(v), ScalarType::Int32) => parse_number(v, target, ScalarValue::Int32),
        (OracleValue::Number(v), ScalarType::Int64) => parse_number(v, target, ScalarValue::Int64),
        (OracleValue::Number(v), ScalarType::Float32) => {
            parse_number(v, target, ScalarValue::Float32)
        }
        (OracleValue::Number(v), ScalarType::Float64) => {
            parse_number(v, target, ScalarValue::Float64)
        }
        (OracleValue::Number(v), ScalarType::Text) => Ok(ScalarValue::Text(v.clone())),
        (OracleValue::Number(v), ScalarType::Bool) => match v.trim() {
            "1" => Ok(ScalarValue::Bool(true)),
            "0" => Ok(ScalarValue::Bool(false)),
            _ => Err(cast_error(target, value)),
        },
        (OracleValue::Date(v), ScalarType::Timestamp) => Ok(ScalarValue::Timestamp(*v)),
        (OracleValue::Timestamp(v), ScalarType::Date) => Ok(ScalarValue::Date(*v)),
        _ => Err(cast_error(target, value)),
    }
}

/// Convert an application scalar into its driver-native bind form
pub fn to_driver(value: &ScalarValue) -> OracleValue {
    match value {
        ScalarValue::Null => OracleValue::Null,
        ScalarValue::Int16(v) => OracleValue::Number(v.to_string()),
        ScalarValue::Int32(v) => OracleValue::Number(v.to_string()),
        ScalarValue::Int64(v) => OracleValue::Number(v.to_string()),
        ScalarValue::Float32(v) => OracleValue::Number(v.to_string()),
        ScalarValue::Float64(v) => OracleValue::Number(v.to_string()),
        ScalarValue::Decimal(v) => OracleValue::Number(v.clone()),
        ScalarValue::Text(v) => OracleValue::Varchar(v.clone()),
        ScalarValue::Bool(v) => OracleValue::Number(if *v { "1" } else { "0" }.to_string()),
        ScalarValue::Date(v) => OracleValue::Date(*v),
        ScalarValue::Timestamp(v) => OracleValue::Timestamp(*v),
        ScalarValue::TimestampTz(v) => OracleValue::TimestampTz(*v),
        ScalarValue::IntervalDs(v) => OracleValue::IntervalDs(*v),
        ScalarValue::IntervalYm(v) => OracleValue::IntervalYm(*v),
        ScalarValue::Bytes(v) => OracleValue::Raw(v.clone()),
    }
}

/// Decode a 0/1/null numeric into a three-valued boolean
pub fn boolean_from_driver(value: &OracleValue) -> UdtResult<Option<bool>> {
    match value {
        OracleValue::Null => Ok(None),
        OracleValue::Number(v) => match v.trim() {
            "1" => Ok(Some(true)),
            "0" => Ok(Some(false)),
            _ => Err(cast_error(ScalarType::Bool, value)),
        },
        _ => Err(cast_error(ScalarType::Bool, value)),
    }
}

/// Parse a scalar out of XML-projected element text
///
/// An empty element is the projection of a null attribute.
pub fn scalar_from_text(text: &str, target: ScalarType, nullable: bool) -> UdtResult<ScalarValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return null_result(target, nullable);
    }
    let failed = || UdtError::Cast {
        target: target.to_string(),
        value: trimmed.to_string(),
    };
    match target {
        ScalarType::Int16 => trimmed.parse().map(ScalarValue::Int16).map_err(|_| failed()),
        ScalarType::Int32 => trimmed.parse().map(ScalarValue::Int32).map_err(|_| failed()),
        ScalarType::Int64 => trimmed.parse().map(ScalarValue::Int64).map_err(|_| failed()),
        ScalarType::Float32 => trimmed.parse().map(ScalarValue::Float32).map_err(|_| failed()),
        ScalarType::Float64 => trimmed.parse().map(ScalarValue::Float64).map_err(|_| failed()),
        ScalarType::Decimal => Ok(ScalarValue::Decimal(trimmed.to_string())),
        ScalarType::Text => Ok(ScalarValue::Text(trimmed.to_string())),
        ScalarType::Bool => match trimmed {
            "1" | "true" => Ok(ScalarValue::Bool(true)),
            "0" | "false" => Ok(ScalarValue::Bool(false)),
            _ => Err(failed()),
        },
        ScalarType::Date => parse_datetime_text(trimmed)
            .map(ScalarValue::Date)
            .ok_or_else(failed),
        ScalarType::Timestamp => parse_datetime_text(trimmed)
            .map(ScalarValue::Timestamp)
            .ok_or_else(failed),
        ScalarType::TimestampTz => DateTime::parse_from_rfc3339(trimmed)
            .map(ScalarValue::TimestampTz)
            .map_err(|_| failed()),
        ScalarType::IntervalDs => trimmed
            .parse()
            .map(ScalarValue::IntervalDs)
            .map_err(|_| failed()),
        ScalarType::IntervalYm => trimmed
            .parse()
            .map(ScalarValue::IntervalYm)
            .map_err(|_| failed()),
        ScalarType::Bytes => decode_hex(trimmed).map(ScalarValue::Bytes).ok_or_else(failed),
    }
}

fn null_result(target: ScalarType, nullable: bool) -> UdtResult<ScalarValue> {
    if nullable {
        Ok(ScalarValue::Null)
    } else {
        Err(UdtError::Cast {
            target: target.to_string(),
            value: "null".to_string(),
        })
    }
}

fn cast_error(target: ScalarType, value: &OracleValue) -> UdtError {
    UdtError::Cast {
        target: target.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(
    text: &str,
    target: ScalarType,
    wrap: fn(T) -> ScalarValue,
) -> UdtResult<ScalarValue> {
    text.trim().parse().map(wrap).map_err(|_| UdtError::Cast {
        target: target.to_string(),
        value: text.to_string(),
    })
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    if let Ok(value) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(value);
    }
    if let Ok(value) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(value);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_against_required_type_fails() {
        let err = to_application(&OracleValue::Null, ScalarType::Int32, false).unwrap_err();
        assert!(err.to_string().contains("i32"));
    }

    #[test]
    fn test_null_against_nullable_type_is_null() {
        let value = to_application(&OracleValue::Null, ScalarType::Int32, true).unwrap();
        assert_eq!(value, ScalarValue::Null);
    }

    #[test]
    fn test_number_conversions() {
        let number = OracleValue::Number("42".to_string());
        assert_eq!(
            to_application(&number, ScalarType::Int32, false).unwrap(),
            ScalarValue::Int32(42)
        );
        assert_eq!(
            to_application(&number, ScalarType::Int64, false).unwrap(),
            ScalarValue::Int64(42)
        );
        assert_eq!(
            to_application(&number, ScalarType::Decimal, false).unwrap(),
            ScalarValue::Decimal("42".to_string())
        );
    }

    #[test]
    fn test_unsupported_kind_carries_value_string() {
        let value = OracleValue::Varchar("abc".to_string());
        let err = to_application(&value, ScalarType::Int32, false).unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert value 'abc' to i32");
    }

    #[test]
    fn test_boolean_from_driver() {
        assert_eq!(boolean_from_driver(&OracleValue::Null).unwrap(), None);
        assert_eq!(
            boolean_from_driver(&OracleValue::Number("1".to_string())).unwrap(),
            Some(true)
        );
        assert_eq!(
            boolean_from_driver(&OracleValue::Number("0".to_string())).unwrap(),
            Some(false)
        );
        assert!(boolean_from_driver(&OracleValue::Number("2".to_string())).is_err());
    }

    #[test]
    fn test_round_trip_to_driver() {
        let scalar = ScalarValue::Text("Ann".to_string());
        assert_eq!(to_driver(&scalar), OracleValue::Varchar("Ann".to_string()));
        assert_eq!(to_driver(&ScalarValue::Bool(true)), OracleValue::Number("1".to_string()));
        assert_eq!(to_driver(&ScalarValue::Null), OracleValue::Null);
    }

    #[test]
    fn test_scalar_from_text() {
        assert_eq!(
            scalar_from_text("7", ScalarType::Int32, true).unwrap(),
            ScalarValue::Int32(7)
        );
        assert_eq!(
            scalar_from_text("", ScalarType::Text, true).unwrap(),
            ScalarValue::Null
        );
        assert!(scalar_from_text("", ScalarType::Int32, false).is_err());
        assert_eq!(
            scalar_from_text("2024-05-01 10:30:00", ScalarType::Timestamp, true).unwrap(),
            ScalarValue::Timestamp(
                chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                    .unwrap()
                    .and_hms_opt(10, 30, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            scalar_from_text("0A0B", ScalarType::Bytes, true).unwrap(),
            ScalarValue::Bytes(vec![0x0a, 0x0b])
        );
    }
}
