//! Oracle UDT stored-procedure invocation engine
//!
//! Marshals application value graphs into Oracle user-defined types and
//! back without client-side object type support: each call compiles into
//! one anonymous PL/SQL block that constructs UDT arguments from scalar
//! binds, invokes the routine, and projects UDT outputs through ref
//! cursors with nested composites encoded as XML.
//!
//! The main building blocks:
//! - [`identity::UdtIdentity`]: validated `SCHEMA.NAME|SCHEMA.COLLECTION`
//!   type identities
//! - [`schema::SchemaBuilder`]: recursive type discovery from the data
//!   dictionary, memoized in a [`cache::MetadataCache`]
//! - [`binding`]: explicit application type descriptors bound against
//!   discovered schema trees
//! - [`codec::TypeCodec`]: PL/SQL fragment generation and output
//!   materialization per bound type
//! - [`params`]: the scalar / boolean / object parameter hierarchy
//! - [`orchestrator::UdtOrchestrator`]: call compilation and execution
//!   over the driver abstraction in [`driver`]

pub mod binding;
pub mod cache;
pub mod codec;
pub mod convert;
pub mod driver;
pub mod error;
pub mod identity;
pub mod orchestrator;
pub mod params;
pub mod schema;
pub mod value;

pub use binding::{FieldDescriptor, FieldKind, TypeDescriptor};
pub use cache::{MatchMode, MetadataCache, TypeMapping};
pub use error::{UdtError, UdtResult};
pub use identity::UdtIdentity;
pub use orchestrator::UdtOrchestrator;
pub use params::{BooleanParam, Direction, ObjectParam, Param, ScalarParam};
pub use value::{ScalarType, ScalarValue, UdtValue};
