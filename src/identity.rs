//! UDT identity: schema-qualified object type name plus an optional
//! companion collection type
//!
//! All name segments are upper-cased on construction so cache keys and
//! equality checks are case-insensitive with respect to the source.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{UdtError, UdtResult};

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_$#]*$").unwrap());

/// Identifies a database UDT by schema and name, optionally together with
/// the collection type wrapping it
///
/// Immutable once built. Parse forms: `"SCHEMA.NAME"` or
/// `"SCHEMA.NAME|SCHEMA.COLLECTION"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UdtIdentity {
    object_schema: String,
    object_name: String,
    collection_schema: Option<String>,
    collection_name: Option<String>,
}

impl UdtIdentity {
    /// Create an identity for a plain object type
    pub fn new(schema: &str, name: &str) -> UdtResult<Self> {
        Ok(Self {
            object_schema: validate_segment(schema)?,
            object_name: validate_segment(name)?,
            collection_schema: None,
            collection_name: None,
        })
    }

    /// Create an identity for an object type with a companion collection type
    pub fn with_collection(
        schema: &str,
        name: &str,
        collection_schema: &str,
        collection_name: &str,
    ) -> UdtResult<Self> {
        Ok(Self {
            object_schema: validate_segment(schema)?,
            object_name: validate_segment(name)?,
            collection_schema: Some(validate_segment(collection_schema)?),
            collection_name: Some(validate_segment(collection_name)?),
        })
    }

    /// Parse `"SCHEMA.NAME"` or `"SCHEMA.NAME|SCHEMA.COLLECTION"`
    pub fn parse(source: &str) -> UdtResult<Self> {
        let mut parts = source.splitn(2, '|');
        let object = parts.next().unwrap_or_default();
        let (schema, name) = split_qualified(object)?;
        match parts.next() {
            Some(collection) => {
                let (cschema, cname) = split_qualified(collection)?;
                Self::with_collection(schema, name, cschema, cname)
            }
            None => Self::new(schema, name),
        }
    }

    pub fn object_schema(&self) -> &str {
        &self.object_schema
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// `"SCHEMA.NAME"`, upper-cased
    pub fn full_object_name(&self) -> String {
        format!("{}.{}", self.object_schema, self.object_name)
    }

    /// Whether a companion collection type is configured
    pub fn has_collection(&self) -> bool {
        self.collection_name.is_some()
    }

    /// `"SCHEMA.COLLECTION"`, upper-cased; fails when no collection type
    /// is configured
    pub fn full_collection_name(&self) -> UdtResult<String> {
        match (&self.collection_schema, &self.collection_name) {
            (Some(schema), Some(name)) => Ok(format!("{schema}.{name}")),
            _ => Err(UdtError::Format(format!(
                "no collection type configured for {}",
                self.full_object_name()
            ))),
        }
    }
}

impl fmt::Display for UdtIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_object_name())?;
        if let (Some(schema), Some(name)) = (&self.collection_schema, &self.collection_name) {
            write!(f, "|{schema}.{name}")?;
        }
        Ok(())
    }
}

fn validate_segment(segment: &str) -> UdtResult<String> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return Err(UdtError::Format("empty name segment".to_string()));
    }
    if !IDENTIFIER_REGEX.is_match(trimmed) {
        return Err(UdtError::Format(format!(
            "'{trimmed}' is not a valid identifier"
        )));
    }
    Ok(trimmed.to_uppercase())
}

fn split_qualified(source: &str) -> UdtResult<(&str, &str)> {
    let mut parts = source.splitn(2, '.');
    let schema = parts.next().unwrap_or_default();
    let name = parts
        .next()
        .ok_or_else(|| UdtError::Format(format!("'{source}' is missing the '.' delimiter")))?;
    Ok((schema, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_only() {
        let identity = UdtIdentity::parse("hr.customer_t").unwrap();
        assert_eq!(identity.full_object_name(), "HR.CUSTOMER_T");
        assert!(!identity.has_collection());
        assert!(identity.full_collection_name().is_err());
    }

    #[test]
    fn test_parse_with_collection() {
        let identity = UdtIdentity::parse("hr.customer_t|hr.customer_tab").unwrap();
        assert!(identity.has_collection());
        assert_eq!(identity.full_collection_name().unwrap(), "HR.CUSTOMER_TAB");
        assert_eq!(identity.to_string(), "HR.CUSTOMER_T|HR.CUSTOMER_TAB");
    }

    #[test]
    fn test_missing_delimiter_rejected() {
        assert!(matches!(
            UdtIdentity::parse("customer_t"),
            Err(UdtError::Format(_))
        ));
        assert!(matches!(
            UdtIdentity::parse("hr.customer_t|customer_tab"),
            Err(UdtError::Format(_))
        ));
    }

    #[test]
    fn test_blank_segment_rejected() {
        assert!(UdtIdentity::parse(".customer_t").is_err());
        assert!(UdtIdentity::new("hr", " ").is_err());
        assert!(UdtIdentity::new("hr", "not a name").is_err());
    }

    #[test]
    fn test_structural_equality_ignores_source_case() {
        let a = UdtIdentity::parse("HR.Customer_T").unwrap();
        let b = UdtIdentity::new("hr", "customer_t").unwrap();
        assert_eq!(a, b);
    }
}
