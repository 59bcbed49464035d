//! Core module: Schema model + Schema Registry
//!
//! Prinsip desain:
//! - Explicit instance: registry di-pass ke pipeline, bukan global singleton
//! - Stable ids: id monotonic mulai dari `BASE_SCHEMA_ID`
//! - Canonical identity: schema dibandingkan via canonical form

mod registry;
mod schema;

pub use registry::{RegistryError, SchemaRegistry, BASE_SCHEMA_ID};
pub use schema::{EnumNode, Field, Node, RecordNode, Schema, SchemaError};
