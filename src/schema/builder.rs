//! UDT schema acquisition from the data dictionary
//!
//! Resolution is cache-first: a hit on the shared [`MetadataCache`]
//! returns the stored definition without any database round trip. On a
//! miss the builder queries `ALL_TYPE_ATTRS` for the attribute list and
//! recurses into composite attributes, going through `ALL_COLL_TYPES`
//! first when the referenced type is a collection.

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

use crate::cache::MetadataCache;
use crate::driver::{BindParameter, Connection, OracleValue, RowReader};
use crate::error::{UdtError, UdtResult};
use crate::identity::UdtIdentity;
use crate::orchestrator::blocking_runtime;
use crate::schema::types::{CollectionType, TypeDefinition, TypeProperty};
use crate::value::ScalarType;

/// Attribute listing for one object type, with the referenced type's
/// typecode resolved inline for composite attributes
pub const TYPE_ATTRIBUTES_QUERY: &str = "\
select a.attr_no, a.attr_name, a.attr_type_owner, a.attr_type_name, \
(select t.typecode from all_types t where t.owner = a.attr_type_owner \
and t.type_name = a.attr_type_name) typecode \
from all_type_attrs a where a.owner = :0 and a.type_name = :1 \
order by a.attr_no";

/// Element type lookup for one collection type
pub const COLLECTION_ELEMENT_QUERY: &str = "\
select c.elem_type_owner, c.elem_type_name, \
(select t.typecode from all_types t where t.owner = c.elem_type_owner \
and t.type_name = c.elem_type_name) typecode \
from all_coll_types c where c.owner = :0 and c.type_name = :1";

const TYPECODE_COLLECTION: &str = "COLLECTION";

/// Acquires and caches [`TypeDefinition`] trees
pub struct SchemaBuilder {
    cache: Arc<MetadataCache>,
}

impl SchemaBuilder {
    pub fn new(cache: Arc<MetadataCache>) -> Self {
        Self { cache }
    }

    /// Resolve the definition for the identity's object type, opening the
    /// connection on demand
    pub async fn resolve(
        &self,
        connection: &dyn Connection,
        identity: &UdtIdentity,
    ) -> UdtResult<Arc<TypeDefinition>> {
        if let Some(definition) = self.cache.tree(&identity.full_object_name()) {
            return Ok(definition);
        }
        if !connection.is_open() {
            connection.open().await?;
        }
        self.resolve_object(connection, identity.object_schema(), identity.object_name())
            .await
    }

    /// Blocking variant of [`SchemaBuilder::resolve`]
    pub fn resolve_blocking(
        &self,
        connection: &dyn Connection,
        identity: &UdtIdentity,
    ) -> UdtResult<Arc<TypeDefinition>> {
        blocking_runtime()?.block_on(self.resolve(connection, identity))
    }

    fn resolve_object<'a>(
        &'a self,
        connection: &'a dyn Connection,
        schema: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, UdtResult<Arc<TypeDefinition>>> {
        Box::pin(async move {
            let full_name = format!("{schema}.{name}");
            if let Some(definition) = self.cache.tree(&full_name) {
                return Ok(definition);
            }
            debug!(udt = %full_name, "resolving UDT attributes");

            let mut command = connection.create_command(TYPE_ATTRIBUTES_QUERY)?;
            command.add_parameter(name_bind(0, schema));
            command.add_parameter(name_bind(1, name));
            let mut reader = command.execute_reader().await?;

            let mut properties = Vec::new();
            while reader.next_row().await? {
                let order = number_column(reader.as_ref(), 0)?;
                let attr_name = text_column(reader.as_ref(), 1)?;
                if reader.is_null(2)? {
                    properties.push(TypeProperty::scalar(order, &attr_name));
                    continue;
                }
                let type_owner = text_column(reader.as_ref(), 2)?;
                let type_name = text_column(reader.as_ref(), 3)?;
                let typecode = if reader.is_null(4)? {
                    String::new()
                } else {
                    text_column(reader.as_ref(), 4)?
                };

                let (nested, collection_type) = if typecode == TYPECODE_COLLECTION {
                    let element = self
                        .resolve_collection(connection, &type_owner, &type_name)
                        .await?;
                    (
                        element,
                        Some(CollectionType {
                            schema: type_owner.to_uppercase(),
                            name: type_name.to_uppercase(),
                        }),
                    )
                } else {
                    (
                        self.resolve_object(connection, &type_owner, &type_name)
                            .await?,
                        None,
                    )
                };
                properties.push(TypeProperty {
                    order,
                    name: attr_name.to_uppercase(),
                    nested: Some(nested),
                    collection_type,
                });
            }

            if properties.is_empty() {
                return Err(UdtError::SchemaResolution(full_name));
            }
            let definition = Arc::new(TypeDefinition {
                identity: UdtIdentity::new(schema, name)?,
                properties,
            });
            self.cache.store_tree(definition.clone());
            Ok(definition)
        })
    }

    /// Resolve the element object type of a collection, recursing while
    /// the element is itself a collection
    fn resolve_collection<'a>(
        &'a self,
        connection: &'a dyn Connection,
        schema: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, UdtResult<Arc<TypeDefinition>>> {
        Box::pin(async move {
            let mut command = connection.create_command(COLLECTION_ELEMENT_QUERY)?;
            command.add_parameter(name_bind(0, schema));
            command.add_parameter(name_bind(1, name));
            let mut reader = command.execute_reader().await?;

            if !reader.next_row().await? {
                return Err(UdtError::SchemaResolution(format!("{schema}.{name}")));
            }
            let element_owner = text_column(reader.as_ref(), 0)?;
            let element_name = text_column(reader.as_ref(), 1)?;
            let typecode = if reader.is_null(2)? {
                String::new()
            } else {
                text_column(reader.as_ref(), 2)?
            };

            if typecode == TYPECODE_COLLECTION {
                self.resolve_collection(connection, &element_owner, &element_name)
                    .await
            } else {
                self.resolve_object(connection, &element_owner, &element_name)
                    .await
            }
        })
    }
}

fn name_bind(position: u32, value: &str) -> BindParameter {
    BindParameter::input(
        position,
        ScalarType::Text,
        OracleValue::Varchar(value.to_uppercase()),
    )
}

fn text_column(reader: &(dyn RowReader + Send), ordinal: usize) -> UdtResult<String> {
    match reader.value(ordinal)? {
        OracleValue::Varchar(text) | OracleValue::Char(text) => Ok(text),
        other => Err(UdtError::Driver(format!(
            "expected a text column at ordinal {ordinal}, got '{other}'"
        ))),
    }
}

fn number_column(reader: &(dyn RowReader + Send), ordinal: usize) -> UdtResult<i32> {
    match reader.value(ordinal)? {
        OracleValue::Number(text) => text.trim().parse().map_err(|_| UdtError::Driver(format!(
            "expected an integer column at ordinal {ordinal}, got '{text}'"
        ))),
        other => Err(UdtError::Driver(format!(
            "expected a numeric column at ordinal {ordinal}, got '{other}'"
        ))),
    }
}
