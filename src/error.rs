//! Error types for UDT metadata resolution, statement compilation and
//! value marshaling

use thiserror::Error;

/// Errors that can occur while calling stored procedures with UDT arguments
#[derive(Error, Debug)]
pub enum UdtError {
    /// Malformed UDT identity string or missing declarative mapping
    #[error("Invalid UDT identity format: {0}")]
    Format(String),

    /// Invalid construction argument (e.g. collection type without a
    /// collection-capable identity)
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// A scalar value cannot be converted to or from the requested type
    #[error("Cannot convert value '{value}' to {target}")]
    Cast { target: String, value: String },

    /// The data dictionary returned no rows for a referenced UDT
    #[error("UDT metadata not found for {0}")]
    SchemaResolution(String),

    /// Failure reported by the underlying driver collaborator
    #[error("Driver error: {0}")]
    Driver(String),

    /// Malformed XML payload in a ref-cursor output column
    #[error("Malformed XML payload: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for UdtError {
    fn from(err: quick_xml::Error) -> Self {
        UdtError::Xml(err.to_string())
    }
}

/// Result type for UDT operations
pub type UdtResult<T> = Result<T, UdtError>;
