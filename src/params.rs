//! Call parameter hierarchy
//!
//! Three parameter shapes cover every stored-procedure argument:
//! - `ScalarParam`: plain scalars bound directly as `:N` tokens
//! - `BooleanParam`: PL/SQL `boolean` has no wire representation, so it
//!   crosses the boundary as a 0/1/null numeric with an inline comparison
//!   on the way in and an `if`/`elsif` capture on the way out
//! - `ObjectParam`: UDT values constructed statement-side and read back
//!   through a ref cursor
//!
//! During compilation each parameter contributes fragments to the
//! anonymous block in a fixed phase order (declare, body, call reference,
//! output); bind tokens are drawn from the shared [`ExecutionContext`]
//! at the moment a fragment needs one.

use std::sync::Arc;

use crate::binding::{self, TypeDescriptor};
use crate::cache::MetadataCache;
use crate::codec::TypeCodec;
use crate::convert;
use crate::driver::{BindKind, Command, Connection};
use crate::error::{UdtError, UdtResult};
use crate::identity::UdtIdentity;
use crate::orchestrator::ExecutionContext;
use crate::schema::SchemaBuilder;
use crate::value::{ScalarType, ScalarValue, UdtValue};

/// Which way a parameter's value flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    InputOutput,
}

impl Direction {
    pub fn is_input(self) -> bool {
        matches!(self, Direction::Input | Direction::InputOutput)
    }

    pub fn is_output(self) -> bool {
        matches!(self, Direction::Output | Direction::InputOutput)
    }
}

/// A plain scalar argument
#[derive(Debug)]
pub struct ScalarParam {
    pub name: String,
    pub direction: Direction,
    pub scalar: ScalarType,
    pub value: ScalarValue,
    token: Option<u32>,
}

impl ScalarParam {
    pub fn input(name: &str, value: ScalarValue) -> Self {
        let scalar = value.scalar_type().unwrap_or(ScalarType::Text);
        Self {
            name: name.to_string(),
            direction: Direction::Input,
            scalar,
            value,
            token: None,
        }
    }

    pub fn output(name: &str, scalar: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Output,
            scalar,
            value: ScalarValue::Null,
            token: None,
        }
    }

    pub fn input_output(name: &str, scalar: ScalarType, value: ScalarValue) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::InputOutput,
            scalar,
            value,
            token: None,
        }
    }

    fn call_reference(&mut self, context: &mut ExecutionContext) -> String {
        let token = match self.direction {
            Direction::Input => context.bind_input(self.scalar, convert::to_driver(&self.value)),
            Direction::Output => context.bind_output(BindKind::Scalar(self.scalar)),
            Direction::InputOutput => {
                context.bind_input_output(self.scalar, convert::to_driver(&self.value))
            }
        };
        if self.direction.is_output() {
            self.token = Some(token);
        }
        format!(":{token}")
    }

    fn distribute_output(&mut self, command: &dyn Command) -> UdtResult<()> {
        if let Some(token) = self.token {
            let raw = command.output_value(token)?;
            self.value = convert::to_application(&raw, self.scalar, true)?;
        }
        Ok(())
    }
}

/// A three-valued PL/SQL `boolean` argument
#[derive(Debug)]
pub struct BooleanParam {
    pub name: String,
    pub direction: Direction,
    pub value: Option<bool>,
    out_token: Option<u32>,
}

impl BooleanParam {
    pub fn input(name: &str, value: Option<bool>) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Input,
            value,
            out_token: None,
        }
    }

    pub fn output(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::Output,
            value: None,
            out_token: None,
        }
    }

    pub fn input_output(name: &str, value: Option<bool>) -> Self {
        Self {
            name: name.to_string(),
            direction: Direction::InputOutput,
            value,
            out_token: None,
        }
    }

    fn bind_value(&self) -> crate::driver::OracleValue {
        match self.value {
            Some(true) => crate::driver::OracleValue::Number("1".to_string()),
            Some(false) => crate::driver::OracleValue::Number("0".to_string()),
            None => crate::driver::OracleValue::Null,
        }
    }

    fn declare_fragment(&self, local: &str) -> Option<String> {
        match self.direction {
            Direction::Input => None,
            _ => Some(format!("{local} boolean;")),
        }
    }

    /// Input-output initialization; the comparison keeps a null input
    /// null, and the output capture uses a separate token
    fn body_fragment(&mut self, local: &str, context: &mut ExecutionContext) -> Option<String> {
        match self.direction {
            Direction::InputOutput => {
                let token = context.bind_input(ScalarType::Bool, self.bind_value());
                Some(format!("{local} := (:{token} = 1);"))
            }
            _ => None,
        }
    }

    fn call_reference(&mut self, local: &str, context: &mut ExecutionContext) -> String {
        match self.direction {
            Direction::Input => {
                let token = context.bind_input(ScalarType::Bool, self.bind_value());
                format!("(:{token} = 1)")
            }
            _ => local.to_string(),
        }
    }

    fn output_fragment(&mut self, local: &str, context: &mut ExecutionContext) -> Option<String> {
        if !self.direction.is_output() {
            return None;
        }
        let token = context.bind_output(BindKind::Scalar(ScalarType::Bool));
        self.out_token = Some(token);
        Some(format!(
            "if {local} then :{token} := 1; \
elsif not {local} then :{token} := 0; \
else :{token} := null; end if;"
        ))
    }

    fn distribute_output(&mut self, command: &dyn Command) -> UdtResult<()> {
        if let Some(token) = self.out_token {
            let raw = command.output_value(token)?;
            self.value = convert::boolean_from_driver(&raw)?;
        }
        Ok(())
    }
}

/// A UDT-shaped argument, constructed statement-side and read back
/// through a ref cursor
pub struct ObjectParam {
    pub name: String,
    pub direction: Direction,
    pub identity: UdtIdentity,
    pub descriptor: TypeDescriptor,
    pub value: UdtValue,
    codec: Option<Arc<TypeCodec>>,
    cursor_token: Option<u32>,
}

impl ObjectParam {
    pub fn new(
        name: &str,
        direction: Direction,
        identity: UdtIdentity,
        descriptor: TypeDescriptor,
        value: UdtValue,
    ) -> UdtResult<Self> {
        if descriptor.is_collection() && !identity.has_collection() {
            return Err(UdtError::Argument(format!(
                "parameter '{name}' holds collection type '{}' but its identity \
'{identity}' names no collection type",
                descriptor.type_name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            direction,
            identity,
            descriptor,
            value,
            codec: None,
            cursor_token: None,
        })
    }

    /// Construct with the identity taken from the cache's registered
    /// mapping for the application type
    pub fn mapped(
        name: &str,
        direction: Direction,
        cache: &MetadataCache,
        descriptor: TypeDescriptor,
        value: UdtValue,
    ) -> UdtResult<Self> {
        let mapping = cache.mapping(&descriptor.type_name).ok_or_else(|| {
            UdtError::Format(format!(
                "no UDT mapping registered for application type '{}'",
                descriptor.type_name
            ))
        })?;
        Self::new(name, direction, mapping.identity, descriptor, value)
    }

    /// Resolve schema metadata and build (or reuse) this type's codec
    pub async fn load_metadata(
        &mut self,
        connection: &dyn Connection,
        cache: &Arc<MetadataCache>,
    ) -> UdtResult<()> {
        if self.codec.is_some() {
            return Ok(());
        }
        if let Some(codec) = cache.codec(&self.descriptor.type_name) {
            self.codec = Some(codec);
            return Ok(());
        }
        let builder = SchemaBuilder::new(cache.clone());
        let tree = builder.resolve(connection, &self.identity).await?;
        let bound = binding::bind(&self.descriptor, &tree, cache)?;
        let codec = Arc::new(TypeCodec::new(self.identity.clone(), bound)?);
        cache.store_codec(&self.descriptor.type_name, codec.clone());
        self.codec = Some(codec);
        Ok(())
    }

    fn codec(&self) -> UdtResult<&Arc<TypeCodec>> {
        self.codec.as_ref().ok_or_else(|| {
            UdtError::Argument(format!(
                "metadata for parameter '{}' was not loaded before compilation",
                self.name
            ))
        })
    }

    fn declare_fragment(&self, local: &str) -> UdtResult<String> {
        self.codec()?.declare_line(local)
    }

    fn body_fragment(
        &self,
        local: &str,
        context: &mut ExecutionContext,
    ) -> UdtResult<Option<String>> {
        if !self.direction.is_input() {
            return Ok(None);
        }
        let codec = self.codec()?;
        let mut scalars = Vec::new();
        let statements =
            codec.build_constructor(&self.value, local, context.counter_mut(), &mut scalars)?;
        context.push_input_scalars(&scalars);
        Ok(Some(statements))
    }

    fn output_fragment(
        &mut self,
        local: &str,
        context: &mut ExecutionContext,
    ) -> UdtResult<Option<String>> {
        if !self.direction.is_output() {
            return Ok(None);
        }
        let token = context.bind_output(BindKind::RefCursor);
        self.cursor_token = Some(token);
        Ok(Some(self.codec()?.ref_cursor_query(token, local)))
    }

    async fn distribute_output(&mut self, command: &dyn Command) -> UdtResult<()> {
        if let Some(token) = self.cursor_token {
            let mut reader = command.open_cursor(token).await?;
            self.value = self.codec()?.read_from_cursor(reader.as_mut()).await?;
        }
        Ok(())
    }
}

/// Any call argument
pub enum Param {
    Scalar(ScalarParam),
    Boolean(BooleanParam),
    Object(ObjectParam),
}

impl Param {
    pub fn name(&self) -> &str {
        match self {
            Param::Scalar(p) => &p.name,
            Param::Boolean(p) => &p.name,
            Param::Object(p) => &p.name,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Param::Scalar(p) => p.direction,
            Param::Boolean(p) => p.direction,
            Param::Object(p) => p.direction,
        }
    }

    /// Whether the parameter occupies a named local in the block
    pub fn needs_local_name(&self) -> bool {
        match self {
            Param::Scalar(_) => false,
            Param::Boolean(p) => p.direction != Direction::Input,
            Param::Object(_) => true,
        }
    }

    pub(crate) fn declare_fragment(&self, local: &str) -> UdtResult<Option<String>> {
        match self {
            Param::Scalar(_) => Ok(None),
            Param::Boolean(p) => Ok(p.declare_fragment(local)),
            Param::Object(p) => p.declare_fragment(local).map(Some),
        }
    }

    pub(crate) fn body_fragment(
        &mut self,
        local: &str,
        context: &mut ExecutionContext,
    ) -> UdtResult<Option<String>> {
        match self {
            Param::Scalar(_) => Ok(None),
            Param::Boolean(p) => Ok(p.body_fragment(local, context)),
            Param::Object(p) => p.body_fragment(local, context),
        }
    }

    pub(crate) fn call_reference(
        &mut self,
        local: &str,
        context: &mut ExecutionContext,
    ) -> String {
        match self {
            Param::Scalar(p) => p.call_reference(context),
            Param::Boolean(p) => p.call_reference(local, context),
            Param::Object(_) => local.to_string(),
        }
    }

    pub(crate) fn output_fragment(
        &mut self,
        local: &str,
        context: &mut ExecutionContext,
    ) -> UdtResult<Option<String>> {
        match self {
            Param::Scalar(_) => Ok(None),
            Param::Boolean(p) => Ok(p.output_fragment(local, context)),
            Param::Object(p) => p.output_fragment(local, context),
        }
    }

    pub(crate) async fn distribute_output(&mut self, command: &dyn Command) -> UdtResult<()> {
        match self {
            Param::Scalar(p) => p.distribute_output(command),
            Param::Boolean(p) => p.distribute_output(command),
            Param::Object(p) => p.distribute_output(command).await,
        }
    }

    pub(crate) async fn load_metadata(
        &mut self,
        connection: &dyn Connection,
        cache: &Arc<MetadataCache>,
    ) -> UdtResult<()> {
        match self {
            Param::Object(p) => p.load_metadata(connection, cache).await,
            _ => Ok(()),
        }
    }

    /// The scalar value an output parameter came back with
    pub fn scalar_value(&self) -> Option<&ScalarValue> {
        match self {
            Param::Scalar(p) => Some(&p.value),
            _ => None,
        }
    }

    pub fn boolean_value(&self) -> Option<bool> {
        match self {
            Param::Boolean(p) => p.value,
            _ => None,
        }
    }

    pub fn object_value(&self) -> Option<&UdtValue> {
        match self {
            Param::Object(p) => Some(&p.value),
            _ => None,
        }
    }
}

impl From<ScalarParam> for Param {
    fn from(p: ScalarParam) -> Self {
        Param::Scalar(p)
    }
}

impl From<BooleanParam> for Param {
    fn from(p: BooleanParam) -> Self {
        Param::Boolean(p)
    }
}

impl From<ObjectParam> for Param {
    fn from(p: ObjectParam) -> Self {
        Param::Object(p)
    }
}
