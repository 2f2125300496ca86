//! Driver collaborator abstraction
//!
//! Defines the traits this crate consumes from the surrounding Oracle
//! driver: a connection factory, a connection, a parameterized command
//! with blocking-free execution, and a row reader used both for data
//! dictionary queries and for ref-cursor output iteration. The traits are
//! assumed correct and are faked in tests of this crate.

use async_trait::async_trait;

use crate::error::UdtResult;
use crate::params::Direction;
use crate::value::ScalarType;

mod value;

pub use value::OracleValue;

/// What a bind parameter carries on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindKind {
    /// A scalar bound as the given target type
    Scalar(ScalarType),
    /// An output ref cursor handle
    RefCursor,
}

/// One positional bind parameter of a compiled statement
#[derive(Debug, Clone, PartialEq)]
pub struct BindParameter {
    /// Position equals the `:N` token number in the statement text
    pub position: u32,
    pub direction: Direction,
    pub kind: BindKind,
    pub value: OracleValue,
}

impl BindParameter {
    pub fn input(position: u32, kind: ScalarType, value: OracleValue) -> Self {
        Self {
            position,
            direction: Direction::Input,
            kind: BindKind::Scalar(kind),
            value,
        }
    }

    pub fn output(position: u32, kind: BindKind) -> Self {
        Self {
            position,
            direction: Direction::Output,
            kind,
            value: OracleValue::Null,
        }
    }
}

/// Creates connections; disposal is the implementor's concern
pub trait ConnectionFactory: Send + Sync {
    fn create_connection(&self) -> UdtResult<Box<dyn Connection>>;
}

/// A single database connection
#[async_trait]
pub trait Connection: Send + Sync {
    fn is_open(&self) -> bool;

    /// Open the connection; opening an already open connection is a no-op
    async fn open(&self) -> UdtResult<()>;

    fn create_command(&self, sql: &str) -> UdtResult<Box<dyn Command>>;
}

/// A parameterized command over one connection
///
/// Output accessors take `&self` so decoding can fan out over one
/// executed command.
#[async_trait]
pub trait Command: Send + Sync {
    fn add_parameter(&mut self, parameter: BindParameter);

    /// Execute without producing a row set (anonymous blocks, DML)
    async fn execute(&mut self) -> UdtResult<()>;

    /// Execute and iterate the produced rows
    async fn execute_reader(&mut self) -> UdtResult<Box<dyn RowReader + Send>>;

    /// Value returned through an output bind after `execute`
    fn output_value(&self, position: u32) -> UdtResult<OracleValue>;

    /// Adapt an output ref-cursor bind into a row reader
    async fn open_cursor(&self, position: u32) -> UdtResult<Box<dyn RowReader + Send>>;
}

/// Row-by-row access to a result set or ref cursor
#[async_trait]
pub trait RowReader: Send {
    /// Advance to the next row; `false` when exhausted
    async fn next_row(&mut self) -> UdtResult<bool>;

    /// Driver-native value of the given ordinal in the current row
    fn value(&self, ordinal: usize) -> UdtResult<OracleValue>;

    fn is_null(&self, ordinal: usize) -> UdtResult<bool>;
}
