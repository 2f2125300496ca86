//! Invocation orchestrator
//!
//! Compiles one stored-procedure or stored-function call into a single
//! anonymous PL/SQL block and runs it over a driver connection. The
//! compilation phases run in a fixed order (declarations, constructor
//! bodies, the call statement, output capture) and draw `:N` tokens
//! from one [`ExecutionContext`] so token numbers and bind positions
//! always agree.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;

use crate::cache::MetadataCache;
use crate::convert;
use crate::driver::{BindKind, BindParameter, ConnectionFactory};
use crate::error::{UdtError, UdtResult};
use crate::params::{Direction, Param};
use crate::value::{ScalarType, ScalarValue};

const DEFAULT_METADATA_CONCURRENCY: usize = 4;

/// Shared compilation state of one call: the bind counter and the
/// accumulated positional parameters
#[derive(Default)]
pub struct ExecutionContext {
    counter: u32,
    binds: Vec<BindParameter>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Raw counter access for codec walks that record their scalars
    /// separately
    pub(crate) fn counter_mut(&mut self) -> &mut u32 {
        &mut self.counter
    }

    pub fn bind_input(&mut self, scalar: ScalarType, value: crate::driver::OracleValue) -> u32 {
        let token = self.counter;
        self.counter += 1;
        self.binds.push(BindParameter::input(token, scalar, value));
        token
    }

    pub fn bind_input_output(
        &mut self,
        scalar: ScalarType,
        value: crate::driver::OracleValue,
    ) -> u32 {
        let token = self.counter;
        self.counter += 1;
        self.binds.push(BindParameter {
            position: token,
            direction: Direction::InputOutput,
            kind: BindKind::Scalar(scalar),
            value,
        });
        token
    }

    pub fn bind_output(&mut self, kind: BindKind) -> u32 {
        let token = self.counter;
        self.counter += 1;
        self.binds.push(BindParameter::output(token, kind));
        token
    }

    /// Register the scalars a constructor walk recorded; the walk already
    /// advanced the counter once per scalar
    pub(crate) fn push_input_scalars(&mut self, scalars: &[ScalarValue]) {
        let start = self.counter - scalars.len() as u32;
        for (offset, scalar) in scalars.iter().enumerate() {
            let kind = scalar.scalar_type().unwrap_or(ScalarType::Text);
            self.binds.push(BindParameter::input(
                start + offset as u32,
                kind,
                convert::to_driver(scalar),
            ));
        }
    }

    pub fn binds(&self) -> &[BindParameter] {
        &self.binds
    }

    pub fn into_binds(self) -> Vec<BindParameter> {
        self.binds
    }
}

/// Runtime for the blocking call facade
pub(crate) fn blocking_runtime() -> UdtResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| UdtError::Driver(format!("cannot start blocking runtime: {e}")))
}

/// Entry point for stored-procedure and stored-function invocation
pub struct UdtOrchestrator {
    factory: Arc<dyn ConnectionFactory>,
    cache: Arc<MetadataCache>,
    metadata_concurrency: usize,
}

impl UdtOrchestrator {
    pub fn new(factory: Arc<dyn ConnectionFactory>, cache: Arc<MetadataCache>) -> Self {
        Self {
            factory,
            cache,
            metadata_concurrency: DEFAULT_METADATA_CONCURRENCY,
        }
    }

    /// Cap on concurrently running metadata resolutions per call
    pub fn with_metadata_concurrency(mut self, concurrency: usize) -> Self {
        self.metadata_concurrency = concurrency.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    /// Invoke a stored procedure; output parameters carry their values
    /// after the call returns
    pub async fn execute_procedure(
        &self,
        procedure: &str,
        params: &mut [Param],
    ) -> UdtResult<()> {
        self.execute_call(procedure, None, params).await
    }

    /// Invoke a stored function; `ret` must be an output-direction
    /// parameter and receives the return value
    pub async fn execute_function(
        &self,
        function: &str,
        ret: &mut Param,
        params: &mut [Param],
    ) -> UdtResult<()> {
        if ret.direction() != Direction::Output {
            return Err(UdtError::Argument(format!(
                "function return '{}' must have output direction",
                ret.name()
            )));
        }
        self.execute_call(function, Some(ret), params).await
    }

    /// Blocking variant of [`UdtOrchestrator::execute_procedure`]
    pub fn execute_procedure_blocking(
        &self,
        procedure: &str,
        params: &mut [Param],
    ) -> UdtResult<()> {
        blocking_runtime()?.block_on(self.execute_procedure(procedure, params))
    }

    /// Blocking variant of [`UdtOrchestrator::execute_function`]
    pub fn execute_function_blocking(
        &self,
        function: &str,
        ret: &mut Param,
        params: &mut [Param],
    ) -> UdtResult<()> {
        blocking_runtime()?.block_on(self.execute_function(function, ret, params))
    }

    async fn execute_call(
        &self,
        routine: &str,
        mut ret: Option<&mut Param>,
        params: &mut [Param],
    ) -> UdtResult<()> {
        let connection = self.factory.create_connection()?;
        if !connection.is_open() {
            connection.open().await?;
        }

        if let Some(ret) = ret.as_deref_mut() {
            ret.load_metadata(connection.as_ref(), &self.cache).await?;
        }
        for chunk in params.chunks_mut(self.metadata_concurrency) {
            try_join_all(
                chunk
                    .iter_mut()
                    .map(|param| param.load_metadata(connection.as_ref(), &self.cache)),
            )
            .await?;
        }

        let mut context = ExecutionContext::new();
        let block = compile_block(routine, ret.as_deref_mut(), params, &mut context)?;
        debug!(
            routine,
            parameters = context.binds().len(),
            "executing anonymous block"
        );

        let mut command = connection.create_command(&block)?;
        for bind in context.into_binds() {
            command.add_parameter(bind);
        }
        command.execute().await?;

        let mut outputs: Vec<&mut Param> = params
            .iter_mut()
            .filter(|param| param.direction().is_output())
            .collect();
        for chunk in outputs.chunks_mut(self.metadata_concurrency) {
            try_join_all(
                chunk
                    .iter_mut()
                    .map(|param| param.distribute_output(command.as_ref())),
            )
            .await?;
        }
        if let Some(ret) = ret {
            ret.distribute_output(command.as_ref()).await?;
        }
        Ok(())
    }
}

/// Assemble the anonymous block for one call
///
/// Local names `p0, p1, …` are assigned in argument order to the
/// parameters that occupy a local, independently from bind-token
/// numbers. The function return's declaration and output fragment, when
/// present, go last in their sections.
fn compile_block(
    routine: &str,
    mut ret: Option<&mut Param>,
    params: &mut [Param],
    context: &mut ExecutionContext,
) -> UdtResult<String> {
    let mut locals = Vec::with_capacity(params.len());
    let mut local_seq = 0usize;
    for param in params.iter() {
        if param.needs_local_name() {
            locals.push(format!("p{local_seq}"));
            local_seq += 1;
        } else {
            locals.push(String::new());
        }
    }

    let mut declares = Vec::new();
    let mut body = Vec::new();
    let mut outputs = Vec::new();

    for (param, local) in params.iter().zip(&locals) {
        if let Some(fragment) = param.declare_fragment(local)? {
            declares.push(fragment);
        }
    }
    if let Some(ret) = ret.as_deref_mut() {
        if let Some(fragment) = ret.declare_fragment("ret")? {
            declares.push(fragment);
        }
    }
    for (param, local) in params.iter_mut().zip(&locals) {
        if let Some(fragment) = param.body_fragment(local, context)? {
            body.push(fragment);
        }
    }

    // The return target draws its token before any argument token.
    let target = ret
        .as_deref_mut()
        .map(|ret| ret.call_reference("ret", context));
    let arguments = params
        .iter_mut()
        .zip(&locals)
        .map(|(param, local)| param.call_reference(local, context))
        .collect::<Vec<_>>()
        .join(", ");
    let call = match &target {
        Some(target) => format!("{target} := {routine}({arguments});"),
        None => format!("{routine}({arguments});"),
    };

    for (param, local) in params.iter_mut().zip(&locals) {
        if let Some(fragment) = param.output_fragment(local, context)? {
            outputs.push(fragment);
        }
    }
    if let Some(ret) = ret {
        if let Some(fragment) = ret.output_fragment("ret", context)? {
            outputs.push(fragment);
        }
    }

    // Fixed section order, sections separated by a blank line.
    let mut sections = Vec::new();
    if !declares.is_empty() {
        sections.push(format!("declare\n{}", declares.join("\n")));
    }
    let mut begin = String::from("begin");
    if !body.is_empty() {
        begin.push('\n');
        begin.push_str(&body.join("\n"));
    }
    sections.push(begin);
    sections.push(call);
    if !outputs.is_empty() {
        sections.push(outputs.join("\n"));
    }
    sections.push("end;".to_string());
    Ok(sections.join("\n\n"))
}
