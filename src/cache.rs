//! Process-wide metadata cache
//!
//! Three independent keyed stores: UDT-name overrides per application
//! type, resolved schema trees by UDT full name, and resolved codecs by
//! application type token. The cache is explicitly constructed and
//! injected (`Arc<MetadataCache>`); there is no ambient singleton. All
//! stores are append-only except for explicit override registration.
//! Concurrent identical resolves may both store; last writer wins.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::codec::TypeCodec;
use crate::identity::UdtIdentity;
use crate::schema::TypeDefinition;

/// How the last-resort name-matching strategy behaves for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// Only annotations and the preset property map bind attributes
    Explicit,
    /// Fall back to case-insensitive field-name matching
    #[default]
    CaseInsensitive,
}

/// The resolved declarative mapping tuple for one application type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMapping {
    pub identity: UdtIdentity,
    /// Schema attribute name (upper-case) to application field name
    pub property_map: HashMap<String, String>,
    pub match_mode: MatchMode,
}

impl TypeMapping {
    pub fn new(identity: UdtIdentity) -> Self {
        Self {
            identity,
            property_map: HashMap::new(),
            match_mode: MatchMode::default(),
        }
    }

    pub fn with_property(mut self, attribute: &str, field: &str) -> Self {
        self.property_map
            .insert(attribute.to_uppercase(), field.to_string());
        self
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }
}

/// Memoized store shared by all calls going through one orchestrator
#[derive(Default)]
pub struct MetadataCache {
    mappings: RwLock<HashMap<String, TypeMapping>>,
    trees: RwLock<HashMap<String, Arc<TypeDefinition>>>,
    codecs: RwLock<HashMap<String, Arc<TypeCodec>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) the declarative mapping for a type token
    pub fn register_mapping(&self, type_name: &str, mapping: TypeMapping) {
        self.mappings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(type_name.to_string(), mapping);
    }

    pub fn mapping(&self, type_name: &str) -> Option<TypeMapping> {
        self.mappings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(type_name)
            .cloned()
    }

    pub fn tree(&self, full_name: &str) -> Option<Arc<TypeDefinition>> {
        self.trees
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(full_name)
            .cloned()
    }

    pub fn store_tree(&self, definition: Arc<TypeDefinition>) {
        self.trees
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(definition.full_name(), definition);
    }

    pub fn codec(&self, type_name: &str) -> Option<Arc<TypeCodec>> {
        self.codecs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(type_name)
            .cloned()
    }

    pub fn store_codec(&self, type_name: &str, codec: Arc<TypeCodec>) {
        self.codecs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(type_name.to_string(), codec);
    }
}
