//! Materializing ref-cursor rows into application value trees
//!
//! The output query projects one column per bound root attribute:
//! scalars come back as driver-native values, nested composites as an
//! XML payload column. Collection roots produce one row per element;
//! object roots produce a single row.

use crate::codec::codec::TypeCodec;
use crate::codec::xml::{self, XmlNode};
use crate::binding::{BoundProperty, BoundTypeDefinition, FieldBinding};
use crate::convert;
use crate::driver::{OracleValue, RowReader};
use crate::error::{UdtError, UdtResult};
use crate::value::{ScalarValue, UdtValue};

impl TypeCodec {
    /// Drain a ref-cursor into a value of this codec's type
    ///
    /// A collection yields one element per row; an object yields the
    /// last row, or `Null` when the cursor is empty.
    pub async fn read_from_cursor(
        &self,
        reader: &mut (dyn RowReader + Send),
    ) -> UdtResult<UdtValue> {
        if self.is_collection() {
            let mut elements = Vec::new();
            while reader.next_row().await? {
                elements.push(read_row(self.bound(), reader)?);
            }
            Ok(UdtValue::Collection(elements))
        } else {
            let mut value = UdtValue::Null;
            while reader.next_row().await? {
                value = read_row(self.bound(), reader)?;
            }
            Ok(value)
        }
    }
}

/// Read one row; the column ordinal advances only over bound attributes
fn read_row(def: &BoundTypeDefinition, reader: &(dyn RowReader + Send)) -> UdtResult<UdtValue> {
    let mut fields = std::collections::BTreeMap::new();
    let mut ordinal = 0usize;
    for property in &def.properties {
        let Some(binding) = &property.binding else {
            continue;
        };
        let column = reader.value(ordinal)?;
        ordinal += 1;
        match binding {
            FieldBinding::Scalar {
                field,
                scalar,
                nullable,
            } => {
                let value = convert::to_application(&column, *scalar, *nullable)?;
                fields.insert(field.clone(), UdtValue::Scalar(value));
            }
            FieldBinding::Object { field, nested } => {
                let value = match payload_text(&column, property)? {
                    Some(payload) => {
                        let nodes = xml::parse_fragment(&payload)?;
                        match find_named(&nodes, &property.name) {
                            Some(node) if !node.children.is_empty() => {
                                decode_object(nested, &node.children)?
                            }
                            _ => UdtValue::Null,
                        }
                    }
                    None => UdtValue::Null,
                };
                fields.insert(field.clone(), value);
            }
            FieldBinding::Collection { field, nested, .. } => {
                let value = match payload_text(&column, property)? {
                    Some(payload) => {
                        let nodes = xml::parse_fragment(&payload)?;
                        let mut elements = Vec::new();
                        for node in nodes.iter().filter(|n| n.name == property.name) {
                            elements.push(decode_object(nested, &node.children)?);
                        }
                        UdtValue::Collection(elements)
                    }
                    None => UdtValue::Null,
                };
                fields.insert(field.clone(), value);
            }
        }
    }
    Ok(UdtValue::Object(fields))
}

/// Decode one composite level from its XML element children
fn decode_object(def: &BoundTypeDefinition, nodes: &[XmlNode]) -> UdtResult<UdtValue> {
    let mut fields = std::collections::BTreeMap::new();
    for property in &def.properties {
        let Some(binding) = &property.binding else {
            continue;
        };
        match binding {
            FieldBinding::Scalar {
                field,
                scalar,
                nullable,
            } => {
                let value = match find_named(nodes, &property.name) {
                    Some(node) => convert::scalar_from_text(&node.text, *scalar, *nullable)?,
                    None => ScalarValue::Null,
                };
                fields.insert(field.clone(), UdtValue::Scalar(value));
            }
            FieldBinding::Object { field, nested } => {
                let value = match find_named(nodes, &property.name) {
                    Some(node) if !node.children.is_empty() => {
                        decode_object(nested, &node.children)?
                    }
                    _ => UdtValue::Null,
                };
                fields.insert(field.clone(), value);
            }
            FieldBinding::Collection { field, nested, .. } => {
                let mut elements = Vec::new();
                for node in nodes.iter().filter(|n| n.name == property.name) {
                    elements.push(decode_object(nested, &node.children)?);
                }
                fields.insert(field.clone(), UdtValue::Collection(elements));
            }
        }
    }
    Ok(UdtValue::Object(fields))
}

fn find_named<'a>(nodes: &'a [XmlNode], name: &str) -> Option<&'a XmlNode> {
    nodes.iter().find(|n| n.name == name)
}

/// Text of an XML payload column; a null column is a null composite
fn payload_text(column: &OracleValue, property: &BoundProperty) -> UdtResult<Option<String>> {
    match column {
        OracleValue::Null => Ok(None),
        OracleValue::Varchar(text) | OracleValue::Char(text) | OracleValue::Clob(text) => {
            Ok(Some(text.clone()))
        }
        other => Err(UdtError::Xml(format!(
            "attribute {} projected a non-text payload: {other}",
            property.name
        ))),
    }
}
