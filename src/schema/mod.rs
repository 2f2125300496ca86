//! UDT schema discovery
//!
//! This module provides:
//! - The discovered-shape types (`TypeDefinition`, `TypeProperty`)
//! - `SchemaBuilder`, which acquires shapes from the data dictionary
//!   (cache-first, recursively for nested objects and collections)

mod builder;
mod types;

pub use builder::{COLLECTION_ELEMENT_QUERY, SchemaBuilder, TYPE_ATTRIBUTES_QUERY};
pub use types::{CollectionType, TypeDefinition, TypeProperty};
