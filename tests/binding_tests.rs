//! Binder tests: matching priority, match modes and shape mismatches

use std::sync::Arc;

use oracle_udt_sdk::binding::{self, FieldBinding, FieldDescriptor, TypeDescriptor};
use oracle_udt_sdk::cache::{MatchMode, MetadataCache, TypeMapping};
use oracle_udt_sdk::identity::UdtIdentity;
use oracle_udt_sdk::schema::{TypeDefinition, TypeProperty};
use oracle_udt_sdk::value::ScalarType;

fn tree_with(properties: Vec<TypeProperty>) -> Arc<TypeDefinition> {
    Arc::new(TypeDefinition {
        identity: UdtIdentity::new("hr", "customer_t").unwrap(),
        properties,
    })
}

fn bound_field(binding: &Option<FieldBinding>) -> &str {
    match binding {
        Some(FieldBinding::Scalar { field, .. }) => field,
        Some(FieldBinding::Object { field, .. }) => field,
        Some(FieldBinding::Collection { field, .. }) => field,
        None => panic!("attribute is unbound"),
    }
}

mod matching_tests {
    use super::*;

    #[test]
    fn test_case_insensitive_name_match_by_default() {
        let tree = tree_with(vec![TypeProperty::scalar(1, "full_name")]);
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("FULL_name", ScalarType::Text, true));
        let bound = binding::bind(&descriptor, &tree, &MetadataCache::new()).unwrap();
        assert_eq!(bound_field(&bound.properties[0].binding), "FULL_name");
    }

    #[test]
    fn test_annotation_beats_name_match() {
        let tree = tree_with(vec![TypeProperty::scalar(1, "full_name")]);
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("full_name", ScalarType::Text, true))
            .with_field(
                FieldDescriptor::scalar("displayName", ScalarType::Text, true)
                    .with_udt_name("full_name"),
            );
        let bound = binding::bind(&descriptor, &tree, &MetadataCache::new()).unwrap();
        assert_eq!(bound_field(&bound.properties[0].binding), "displayName");
    }

    #[test]
    fn test_preset_map_beats_name_match() {
        let cache = MetadataCache::new();
        cache.register_mapping(
            "Customer",
            TypeMapping::new(UdtIdentity::parse("hr.customer_t").unwrap())
                .with_property("full_name", "displayName"),
        );
        let tree = tree_with(vec![TypeProperty::scalar(1, "full_name")]);
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("full_name", ScalarType::Text, true))
            .with_field(FieldDescriptor::scalar("displayName", ScalarType::Text, true));
        let bound = binding::bind(&descriptor, &tree, &cache).unwrap();
        assert_eq!(bound_field(&bound.properties[0].binding), "displayName");
    }

    #[test]
    fn test_explicit_mode_disables_name_match() {
        let cache = MetadataCache::new();
        cache.register_mapping(
            "Customer",
            TypeMapping::new(UdtIdentity::parse("hr.customer_t").unwrap())
                .with_match_mode(MatchMode::Explicit),
        );
        let tree = tree_with(vec![TypeProperty::scalar(1, "name")]);
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("name", ScalarType::Text, true));
        let bound = binding::bind(&descriptor, &tree, &cache).unwrap();
        assert!(bound.properties[0].binding.is_none());
    }

    #[test]
    fn test_unmatched_attribute_stays_unbound() {
        let tree = tree_with(vec![
            TypeProperty::scalar(1, "name"),
            TypeProperty::scalar(2, "legacy_code"),
        ]);
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("name", ScalarType::Text, true));
        let bound = binding::bind(&descriptor, &tree, &MetadataCache::new()).unwrap();
        assert!(bound.properties[0].binding.is_some());
        assert!(bound.properties[1].binding.is_none());
    }
}

mod shape_tests {
    use super::*;

    #[test]
    fn test_scalar_field_against_composite_attribute_is_unbound() {
        let nested = tree_with(vec![TypeProperty::scalar(1, "street")]);
        let tree = tree_with(vec![TypeProperty {
            order: 1,
            name: "ADDR".to_string(),
            nested: Some(nested),
            collection_type: None,
        }]);
        let descriptor = TypeDescriptor::object("Customer")
            .with_field(FieldDescriptor::scalar("addr", ScalarType::Text, true));
        let bound = binding::bind(&descriptor, &tree, &MetadataCache::new()).unwrap();
        assert!(bound.properties[0].binding.is_none());
    }

    #[test]
    fn test_collection_of_collections_rejected() {
        let tree = tree_with(vec![TypeProperty::scalar(1, "name")]);
        let inner = TypeDescriptor::collection(
            "Inner",
            TypeDescriptor::object("Customer")
                .with_field(FieldDescriptor::scalar("name", ScalarType::Text, true)),
        );
        let descriptor = TypeDescriptor::collection("Outer", inner);
        assert!(binding::bind(&descriptor, &tree, &MetadataCache::new()).is_err());
    }

    #[test]
    fn test_collection_field_binds_element_shape() {
        let order_tree = tree_with(vec![TypeProperty::scalar(1, "id")]);
        let tree = tree_with(vec![TypeProperty {
            order: 1,
            name: "ORDERS".to_string(),
            nested: Some(order_tree),
            collection_type: Some(oracle_udt_sdk::schema::CollectionType {
                schema: "HR".to_string(),
                name: "ORDER_TAB".to_string(),
            }),
        }]);
        let descriptor = TypeDescriptor::object("Customer").with_field(FieldDescriptor::collection(
            "orders",
            TypeDescriptor::object("Order")
                .with_field(FieldDescriptor::scalar("id", ScalarType::Int32, true)),
        ));
        let bound = binding::bind(&descriptor, &tree, &MetadataCache::new()).unwrap();
        match &bound.properties[0].binding {
            Some(FieldBinding::Collection {
                collection_name,
                nested,
                ..
            }) => {
                assert_eq!(collection_name, "HR.ORDER_TAB");
                assert!(nested.is_collection);
                assert_eq!(nested.properties.len(), 1);
            }
            other => panic!("expected a collection binding, got {other:?}"),
        }
    }
}
