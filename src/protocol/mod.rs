//! Protocol Layer: Schema-Framed Binary Encoding
//!
//! Prinsip desain:
//! - Fixed 5-byte header: magic + schema id big-endian
//! - Pluggable codec: `SchemaCodec` trait, default Avro binary
//! - Zero-copy decode: payload dibaca langsung dari slice input

mod codec;
mod frame;
mod pipeline;
mod subject;

pub use codec::{AvroCodec, CodecError, SchemaCodec};
pub use frame::{FrameError, FrameHeader, HEADER_SIZE, MAGIC_BYTE};
pub use pipeline::{SerdeError, SerdePipeline};
pub use subject::{topic_subject, MessageField};
