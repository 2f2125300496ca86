//! Per-type statement codec
//!
//! A `TypeCodec` owns one bound type definition and knows how to render
//! every PL/SQL fragment a parameter of that type needs: local variable
//! declarations, constructor statements, the ordered scalar bind list,
//! and the ref-cursor output query. One codec exists per bound
//! application type, shared through the metadata cache.
//!
//! The central invariant is the bind counter: it is threaded strictly
//! left-to-right through every fragment, continues across parameters and
//! never restarts inside nested composites, so no two emitted `:N`
//! tokens collide.

use crate::binding::{BoundTypeDefinition, FieldBinding};
use crate::error::{UdtError, UdtResult};
use crate::identity::UdtIdentity;
use crate::value::{ScalarValue, UdtValue};

/// Statement fragments for one bound application type
#[derive(Debug)]
pub struct TypeCodec {
    identity: UdtIdentity,
    bound: BoundTypeDefinition,
    /// Constructor call with one indexed placeholder per attribute,
    /// precomputed once
    template: String,
}

impl TypeCodec {
    pub fn new(identity: UdtIdentity, bound: BoundTypeDefinition) -> UdtResult<Self> {
        if bound.is_collection && !identity.has_collection() {
            return Err(UdtError::Argument(format!(
                "collection type bound to {} which has no collection type configured",
                identity.full_object_name()
            )));
        }
        let template = object_template(&bound);
        Ok(Self {
            identity,
            bound,
            template,
        })
    }

    pub fn identity(&self) -> &UdtIdentity {
        &self.identity
    }

    pub fn bound(&self) -> &BoundTypeDefinition {
        &self.bound
    }

    pub fn is_collection(&self) -> bool {
        self.bound.is_collection
    }

    /// Declaration lines for a variable of this type, nested composite
    /// children first
    pub fn declare_line(&self, name: &str) -> UdtResult<String> {
        let mut lines = Vec::new();
        declare_children(&self.bound, name, &mut lines);
        if self.bound.is_collection {
            let collection = self.identity.full_collection_name()?;
            lines.push(format!("{name} {collection} := {collection}();"));
        } else {
            lines.push(format!("{name} {};", self.bound.identity.full_object_name()));
        }
        Ok(lines.join("\n"))
    }

    /// Constructor statements assigning `name`, advancing the shared
    /// counter and recording the scalar bind values in walk order
    pub fn build_constructor(
        &self,
        value: &UdtValue,
        name: &str,
        counter: &mut u32,
        binds: &mut Vec<ScalarValue>,
    ) -> UdtResult<String> {
        let mut statements = Vec::new();
        if self.bound.is_collection {
            for element in value.elements() {
                statements.push(format!("{name}.extend;"));
                emit_object(
                    &self.bound,
                    Some(&self.template),
                    element,
                    &format!("{name}({name}.last)"),
                    name,
                    counter,
                    binds,
                    &mut statements,
                )?;
            }
        } else {
            emit_object(
                &self.bound,
                Some(&self.template),
                value,
                name,
                name,
                counter,
                binds,
                &mut statements,
            )?;
        }
        Ok(statements.join("\n"))
    }

    /// The ordered scalar bind values the constructor walk would record,
    /// without emitting text
    pub fn parameters(&self, value: &UdtValue) -> UdtResult<Vec<ScalarValue>> {
        let mut out = Vec::new();
        if self.bound.is_collection {
            for element in value.elements() {
                collect_scalars(&self.bound, element, &mut out)?;
            }
        } else {
            collect_scalars(&self.bound, value, &mut out)?;
        }
        Ok(out)
    }

    /// Ref-cursor output query extracting the variable's bound
    /// attributes, nested composites encoded as XML payloads
    pub fn ref_cursor_query(&self, token: u32, field_name: &str) -> String {
        let mut alias_seq = 0usize;
        let (source, from_clause) = if self.bound.is_collection {
            alias_seq = 1;
            ("value(c0)".to_string(), format!("table({field_name}) c0"))
        } else {
            (format!("value({field_name})"), "dual".to_string())
        };
        let columns = root_projection(&self.bound, &source, &mut alias_seq);
        format!("open :{token} for select {columns} from {from_clause};")
    }
}

/// `"S.N(ATTR1=>{0},ATTR2=>{1},…)"` for one definition level
fn object_template(def: &BoundTypeDefinition) -> String {
    let arguments = def
        .properties
        .iter()
        .enumerate()
        .map(|(i, property)| format!("{}=>{{{i}}}", property.name))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}({arguments})", def.identity.full_object_name())
}

fn fill_template(template: &str, arguments: &[String]) -> String {
    let mut filled = template.to_string();
    for (i, argument) in arguments.iter().enumerate() {
        filled = filled.replacen(&format!("{{{i}}}"), argument, 1);
    }
    filled
}

fn declare_children(def: &BoundTypeDefinition, base: &str, lines: &mut Vec<String>) {
    for (i, property) in def.properties.iter().enumerate() {
        match &property.binding {
            Some(FieldBinding::Object { nested, .. }) => {
                let child = format!("{base}_{i}");
                declare_children(nested, &child, lines);
                lines.push(format!("{child} {};", nested.identity.full_object_name()));
            }
            Some(FieldBinding::Collection {
                nested,
                collection_name,
                ..
            }) => {
                let child = format!("{base}_{i}");
                declare_children(nested, &child, lines);
                lines.push(format!("{child} {collection_name} := {collection_name}();"));
            }
            _ => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_object(
    def: &BoundTypeDefinition,
    template: Option<&str>,
    value: &UdtValue,
    target: &str,
    base: &str,
    counter: &mut u32,
    binds: &mut Vec<ScalarValue>,
    out: &mut Vec<String>,
) -> UdtResult<()> {
    if value.is_null() {
        out.push(format!("{target} := null;"));
        return Ok(());
    }
    let mut arguments = Vec::with_capacity(def.properties.len());
    for (i, property) in def.properties.iter().enumerate() {
        let argument = match &property.binding {
            None => "null".to_string(),
            Some(FieldBinding::Scalar { field, .. }) => match value.field(field) {
                Some(UdtValue::Scalar(scalar)) if !scalar.is_null() => {
                    let token = *counter;
                    *counter += 1;
                    binds.push(scalar.clone());
                    format!(":{token}")
                }
                Some(other) if !other.is_null() => {
                    return Err(UdtError::Argument(format!(
                        "field '{field}' must hold a scalar value"
                    )));
                }
                _ => "null".to_string(),
            },
            Some(FieldBinding::Object { field, nested }) => match value.field(field) {
                Some(nested_value) if !nested_value.is_null() => {
                    let child = format!("{base}_{i}");
                    emit_object(
                        nested,
                        None,
                        nested_value,
                        &child,
                        &child,
                        counter,
                        binds,
                        out,
                    )?;
                    child
                }
                _ => "null".to_string(),
            },
            Some(FieldBinding::Collection { field, nested, .. }) => match value.field(field) {
                Some(nested_value) if !nested_value.is_null() => {
                    let child = format!("{base}_{i}");
                    for element in nested_value.elements() {
                        out.push(format!("{child}.extend;"));
                        emit_object(
                            nested,
                            None,
                            element,
                            &format!("{child}({child}.last)"),
                            &child,
                            counter,
                            binds,
                            out,
                        )?;
                    }
                    child
                }
                _ => "null".to_string(),
            },
        };
        arguments.push(argument);
    }
    let computed;
    let template = match template {
        Some(template) => template,
        None => {
            computed = object_template(def);
            &computed
        }
    };
    out.push(format!("{target} := {};", fill_template(template, &arguments)));
    Ok(())
}

fn collect_scalars(
    def: &BoundTypeDefinition,
    value: &UdtValue,
    out: &mut Vec<ScalarValue>,
) -> UdtResult<()> {
    if value.is_null() {
        return Ok(());
    }
    for property in &def.properties {
        match &property.binding {
            None => {}
            Some(FieldBinding::Scalar { field, .. }) => {
                if let Some(UdtValue::Scalar(scalar)) = value.field(field) {
                    if !scalar.is_null() {
                        out.push(scalar.clone());
                    }
                }
            }
            Some(FieldBinding::Object { field, nested }) => {
                if let Some(nested_value) = value.field(field) {
                    collect_scalars(nested, nested_value, out)?;
                }
            }
            Some(FieldBinding::Collection { field, nested, .. }) => {
                if let Some(nested_value) = value.field(field) {
                    for element in nested_value.elements() {
                        collect_scalars(nested, element, out)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn root_projection(def: &BoundTypeDefinition, source: &str, alias_seq: &mut usize) -> String {
    let mut columns = Vec::new();
    for property in &def.properties {
        let name = &property.name;
        match &property.binding {
            None => {}
            Some(FieldBinding::Scalar { .. }) => {
                columns.push(format!("{source}.{name} {name}"));
            }
            Some(FieldBinding::Object { nested, .. }) => {
                let inner = xml_projection(nested, &format!("{source}.{name}"), alias_seq);
                columns.push(format!(
                    "(select xmlconcat(xmlelement(\"{name}\", {inner})) from dual) {name}"
                ));
            }
            Some(FieldBinding::Collection { nested, .. }) => {
                let alias = next_alias(alias_seq);
                let inner = xml_projection(nested, &format!("value({alias})"), alias_seq);
                columns.push(format!(
                    "(select xmlagg(xmlconcat(xmlelement(\"{name}\", {inner}))) \
from table({source}.{name}) {alias}) {name}"
                ));
            }
        }
    }
    if columns.is_empty() {
        "1 dummy".to_string()
    } else {
        columns.join(", ")
    }
}

fn xml_projection(def: &BoundTypeDefinition, source: &str, alias_seq: &mut usize) -> String {
    let mut parts = Vec::new();
    for property in &def.properties {
        let name = &property.name;
        match &property.binding {
            None => {}
            Some(FieldBinding::Scalar { .. }) => {
                parts.push(format!("xmlelement(\"{name}\", {source}.{name})"));
            }
            Some(FieldBinding::Object { nested, .. }) => {
                let inner = xml_projection(nested, &format!("{source}.{name}"), alias_seq);
                parts.push(format!("xmlconcat(xmlelement(\"{name}\", {inner}))"));
            }
            Some(FieldBinding::Collection { nested, .. }) => {
                let alias = next_alias(alias_seq);
                let inner = xml_projection(nested, &format!("value({alias})"), alias_seq);
                parts.push(format!(
                    "(select xmlagg(xmlconcat(xmlelement(\"{name}\", {inner}))) \
from table({source}.{name}) {alias})"
                ));
            }
        }
    }
    if parts.is_empty() {
        "null".to_string()
    } else {
        parts.join(", ")
    }
}

fn next_alias(alias_seq: &mut usize) -> String {
    let alias = format!("c{alias_seq}");
    *alias_seq += 1;
    alias
}
