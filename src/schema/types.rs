//! Discovered UDT shape
//!
//! `TypeDefinition` mirrors what the data dictionary reports for one
//! object type: its ordered attributes, each optionally pointing at a
//! nested definition when the attribute is composite. Definitions are
//! built once per UDT full name, cached for the process lifetime and
//! shared by reference, so they are never mutated after construction.

use std::sync::Arc;

use crate::identity::UdtIdentity;

/// The collection type wrapping a composite attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionType {
    pub schema: String,
    pub name: String,
}

impl CollectionType {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// One attribute of an object type
#[derive(Debug, Clone)]
pub struct TypeProperty {
    /// Attribute position as reported by the dictionary (1-based)
    pub order: i32,
    /// Attribute name, upper-case
    pub name: String,
    /// Nested definition when the attribute is composite; for collection
    /// attributes this describes the element object type
    pub nested: Option<Arc<TypeDefinition>>,
    /// Set when the attribute's declared type is a collection
    pub collection_type: Option<CollectionType>,
}

impl TypeProperty {
    pub fn scalar(order: i32, name: &str) -> Self {
        Self {
            order,
            name: name.to_uppercase(),
            nested: None,
            collection_type: None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.nested.is_some()
    }
}

/// A UDT's attribute list as discovered in the database
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub identity: UdtIdentity,
    pub properties: Vec<TypeProperty>,
}

impl TypeDefinition {
    pub fn full_name(&self) -> String {
        self.identity.full_object_name()
    }
}
