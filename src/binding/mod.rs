//! Application-type description and schema binding
//!
//! This module provides:
//! - `TypeDescriptor`/`FieldDescriptor`: explicit, reflection-free
//!   descriptions of application types
//! - `bind`: decorating a discovered schema tree with the matching
//!   application fields (annotation > preset map > case-insensitive name)

mod binder;
mod descriptor;

pub use binder::{BoundProperty, BoundTypeDefinition, FieldBinding, bind};
pub use descriptor::{FieldDescriptor, FieldKind, TypeDescriptor, TypeKind};
