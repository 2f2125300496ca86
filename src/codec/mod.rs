//! PL/SQL fragment generation and output materialization
//!
//! This module provides:
//! - `TypeCodec`: per-type renderer for declarations, constructor
//!   statements, bind lists, and ref-cursor output queries
//! - `xml`: decoder for the XML payloads nested composites come back as

pub(crate) mod codec;
mod materialize;
pub mod xml;

pub use codec::TypeCodec;
