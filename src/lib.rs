//! Serde Speed - Avro round-trip latency benchmark
//!
//! Arsitektur:
//! - core: schema model + in-process schema registry
//! - model: canonical event + coercion ke/dari wire mapping
//! - protocol: 5-byte framing + Avro binary codec + serde pipeline
//! - bench: harness round trip dengan lineage antar pesan

pub mod bench;
pub mod config;
pub mod core;
pub mod model;
pub mod protocol;
