//! Binding discovered UDT shapes to application type descriptors
//!
//! For every schema attribute the binder tries, in priority order: the
//! field's declarative annotation, the registered preset property map,
//! and (unless the mapping opts out) a case-insensitive field-name
//! match. An attribute with no match stays unbound: it renders as `null`
//! on construction and is skipped on materialization. That is a warning,
//! not an error.

use std::sync::Arc;
use tracing::warn;

use crate::binding::descriptor::{FieldDescriptor, FieldKind, TypeDescriptor, TypeKind};
use crate::cache::{MatchMode, MetadataCache, TypeMapping};
use crate::error::{UdtError, UdtResult};
use crate::identity::UdtIdentity;
use crate::schema::{TypeDefinition, TypeProperty};
use crate::value::ScalarType;

/// A schema attribute decorated with the application field it binds to
#[derive(Debug, Clone)]
pub struct BoundProperty {
    pub order: i32,
    /// Attribute name, upper-case
    pub name: String,
    /// `None` for unmatched attributes
    pub binding: Option<FieldBinding>,
}

/// How a bound attribute maps onto the application type
#[derive(Debug, Clone)]
pub enum FieldBinding {
    Scalar {
        field: String,
        scalar: ScalarType,
        nullable: bool,
    },
    Object {
        field: String,
        nested: Box<BoundTypeDefinition>,
    },
    Collection {
        field: String,
        /// Full name of the wrapping collection type, for declarations
        collection_name: String,
        nested: Box<BoundTypeDefinition>,
    },
}

/// A schema tree decorated with application-side bindings
///
/// Built once per `(application type, identity)` pair and memoized; used
/// by exactly one codec.
#[derive(Debug, Clone)]
pub struct BoundTypeDefinition {
    pub identity: UdtIdentity,
    /// Whether the application type itself is a collection
    pub is_collection: bool,
    pub properties: Vec<BoundProperty>,
}

/// Bind an application type descriptor against a discovered schema tree
pub fn bind(
    descriptor: &TypeDescriptor,
    tree: &Arc<TypeDefinition>,
    cache: &MetadataCache,
) -> UdtResult<BoundTypeDefinition> {
    match &descriptor.kind {
        TypeKind::Object { fields } => {
            bind_fields(&descriptor.type_name, fields, tree, cache, false)
        }
        TypeKind::Collection { element } => match &element.kind {
            TypeKind::Object { fields } => {
                bind_fields(&element.type_name, fields, tree, cache, true)
            }
            TypeKind::Collection { .. } => Err(UdtError::Argument(format!(
                "collection element of '{}' must be an object type",
                descriptor.type_name
            ))),
        },
    }
}

fn bind_fields(
    type_name: &str,
    fields: &[FieldDescriptor],
    tree: &Arc<TypeDefinition>,
    cache: &MetadataCache,
    is_collection: bool,
) -> UdtResult<BoundTypeDefinition> {
    let mapping = cache.mapping(type_name);
    let mut properties = Vec::with_capacity(tree.properties.len());

    for property in &tree.properties {
        let matched = match_field(property, fields, mapping.as_ref());
        let binding = match matched {
            Some(field) => bind_field(type_name, property, field, cache)?,
            None => {
                warn!(
                    udt = %tree.full_name(),
                    attribute = %property.name,
                    application_type = type_name,
                    "no application field matches attribute; it will read as null"
                );
                None
            }
        };
        properties.push(BoundProperty {
            order: property.order,
            name: property.name.clone(),
            binding,
        });
    }

    Ok(BoundTypeDefinition {
        identity: tree.identity.clone(),
        is_collection,
        properties,
    })
}

/// Apply the resolver strategies in priority order: annotation, preset
/// map, case-insensitive name
fn match_field<'a>(
    property: &TypeProperty,
    fields: &'a [FieldDescriptor],
    mapping: Option<&TypeMapping>,
) -> Option<&'a FieldDescriptor> {
    if let Some(field) = fields.iter().find(|f| {
        f.udt_name
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(&property.name))
    }) {
        return Some(field);
    }

    if let Some(mapping) = mapping {
        if let Some(field_name) = mapping.property_map.get(&property.name) {
            if let Some(field) = fields.iter().find(|f| f.name == *field_name) {
                return Some(field);
            }
        }
    }

    let match_mode = mapping.map(|m| m.match_mode).unwrap_or_default();
    if match_mode == MatchMode::CaseInsensitive {
        return fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(&property.name));
    }
    None
}

fn bind_field(
    type_name: &str,
    property: &TypeProperty,
    field: &FieldDescriptor,
    cache: &MetadataCache,
) -> UdtResult<Option<FieldBinding>> {
    match (&field.kind, &property.nested) {
        (FieldKind::Scalar { scalar, nullable }, None) => Ok(Some(FieldBinding::Scalar {
            field: field.name.clone(),
            scalar: *scalar,
            nullable: *nullable,
        })),
        (FieldKind::Object(descriptor), Some(nested_tree)) if property.collection_type.is_none() => {
            let nested = bind(descriptor, nested_tree, cache)?;
            Ok(Some(FieldBinding::Object {
                field: field.name.clone(),
                nested: Box::new(nested),
            }))
        }
        (FieldKind::Collection(element), Some(nested_tree)) => {
            let Some(collection_type) = &property.collection_type else {
                return Ok(kind_mismatch(type_name, property, field));
            };
            let nested = match &element.kind {
                TypeKind::Object { fields } => {
                    bind_fields(&element.type_name, fields, nested_tree, cache, true)?
                }
                TypeKind::Collection { .. } => {
                    return Err(UdtError::Argument(format!(
                        "collection element of field '{}' must be an object type",
                        field.name
                    )));
                }
            };
            Ok(Some(FieldBinding::Collection {
                field: field.name.clone(),
                collection_name: collection_type.full_name(),
                nested: Box::new(nested),
            }))
        }
        _ => Ok(kind_mismatch(type_name, property, field)),
    }
}

fn kind_mismatch(
    type_name: &str,
    property: &TypeProperty,
    field: &FieldDescriptor,
) -> Option<FieldBinding> {
    warn!(
        attribute = %property.name,
        field = %field.name,
        application_type = type_name,
        "attribute and field shapes disagree; attribute left unbound"
    );
    None
}
