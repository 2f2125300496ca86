//! Explicit application type descriptors
//!
//! Instead of runtime reflection, callers (or the declarative
//! configuration layer) describe each application type once: its stable
//! type token, its fields, and per field a closed kind classification.
//! The binder matches these descriptors against discovered UDT shapes.

use serde::{Deserialize, Serialize};

use crate::error::{UdtError, UdtResult};
use crate::value::ScalarType;

/// What one application field holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldKind {
    Scalar { scalar: ScalarType, nullable: bool },
    /// A nested object; the descriptor describes that object type
    Object(Box<TypeDescriptor>),
    /// A collection of objects; the descriptor describes the element type
    Collection(Box<TypeDescriptor>),
}

/// One field of an application type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Application-side field name (the key used in `UdtValue::Object`)
    pub name: String,
    /// Declarative annotation: the schema attribute this field maps to
    pub udt_name: Option<String>,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn scalar(name: &str, scalar: ScalarType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            udt_name: None,
            kind: FieldKind::Scalar { scalar, nullable },
        }
    }

    pub fn object(name: &str, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            udt_name: None,
            kind: FieldKind::Object(Box::new(descriptor)),
        }
    }

    pub fn collection(name: &str, element: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            udt_name: None,
            kind: FieldKind::Collection(Box::new(element)),
        }
    }

    /// Annotate the field with the schema attribute name it binds to
    pub fn with_udt_name(mut self, udt_name: &str) -> Self {
        self.udt_name = Some(udt_name.to_uppercase());
        self
    }
}

/// Shape of an application type: a field-carrying object or a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Object { fields: Vec<FieldDescriptor> },
    Collection { element: Box<TypeDescriptor> },
}

/// An application type, keyed by a stable type token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Stable identity token; codec cache key
    pub type_name: String,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Load a descriptor from its JSON form, as stored in configuration
    /// files
    pub fn from_json(source: &str) -> UdtResult<Self> {
        serde_json::from_str(source)
            .map_err(|e| UdtError::Format(format!("invalid type descriptor: {e}")))
    }

    pub fn object(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            kind: TypeKind::Object { fields: Vec::new() },
        }
    }

    pub fn collection(type_name: &str, element: TypeDescriptor) -> Self {
        Self {
            type_name: type_name.to_string(),
            kind: TypeKind::Collection {
                element: Box::new(element),
            },
        }
    }

    /// Append a field; meaningful for object descriptors only
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        if let TypeKind::Object { fields } = &mut self.kind {
            fields.push(field);
        }
        self
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection { .. })
    }

    /// Element descriptor for a collection type
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match &self.kind {
            TypeKind::Collection { element } => Some(element),
            TypeKind::Object { .. } => None,
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            TypeKind::Object { fields } => fields,
            TypeKind::Collection { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes() {
        let address = TypeDescriptor::object("Address")
            .with_field(FieldDescriptor::scalar("street", ScalarType::Text, true));
        let customer = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("name", ScalarType::Text, true))
            .with_field(FieldDescriptor::object("address", address));
        assert_eq!(customer.fields().len(), 2);
        assert!(!customer.is_collection());

        let customers = TypeDescriptor::collection("CustomerList", customer);
        assert!(customers.is_collection());
        assert_eq!(customers.element().unwrap().type_name, "Customer");
        assert!(customers.fields().is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("name", ScalarType::Text, true))
            .with_field(
                FieldDescriptor::scalar("age", ScalarType::Int32, true).with_udt_name("age"),
            );
        let json = serde_json::to_string(&descriptor).unwrap();
        assert_eq!(TypeDescriptor::from_json(&json).unwrap(), descriptor);
        assert!(TypeDescriptor::from_json("{not json").is_err());
    }

    #[test]
    fn test_udt_name_annotation_uppercased() {
        let field =
            FieldDescriptor::scalar("fullName", ScalarType::Text, true).with_udt_name("full_name");
        assert_eq!(field.udt_name.as_deref(), Some("FULL_NAME"));
    }
}
