//! Serde Pipeline: registry + codec + framing
//!
//! Encode: mapping -> `[magic][schema id][payload]`
//! Decode: frame -> resolve schema via id -> mapping mentah
//!
//! Konversi mapping ke typed event bukan tugas layer ini.

use crate::core::{RegistryError, Schema, SchemaRegistry};
use crate::model::WireValue;

use super::codec::{AvroCodec, CodecError, SchemaCodec};
use super::frame::{FrameError, FrameHeader};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SerdeError {
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("schema not registered under subject `{subject}` and auto-register is off")]
    NotRegistered { subject: String },
}

/// Pipeline untuk satu subject + schema
#[derive(Debug)]
pub struct SerdePipeline<C: SchemaCodec = AvroCodec> {
    subject: String,
    schema: Schema,
    codec: C,
    auto_register: bool,
    /// Id yang dipakai frame terakhir; bukan cache, registry tetap ditanya
    /// setiap encode
    schema_id: Option<u32>,
    /// Ukuran frame terakhir, untuk pre-allocate buffer berikutnya
    size_hint: usize,
}

impl SerdePipeline<AvroCodec> {
    pub fn avro(subject: impl Into<String>, schema: Schema) -> Self {
        Self::new(subject, schema, AvroCodec)
    }
}

impl<C: SchemaCodec> SerdePipeline<C> {
    /// Pipeline baru, auto-register aktif
    pub fn new(subject: impl Into<String>, schema: Schema, codec: C) -> Self {
        Self {
            subject: subject.into(),
            schema,
            codec,
            auto_register: true,
            schema_id: None,
            size_hint: 64,
        }
    }

    pub fn with_auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Id schema di frame terakhir (None sebelum encode pertama)
    #[inline]
    pub fn schema_id(&self) -> Option<u32> {
        self.schema_id
    }

    /// Id selalu berasal dari `registry` yang diberikan, jadi frame tidak
    /// pernah membawa id yang tidak dikenal registry tersebut.
    fn resolve_schema_id(&mut self, registry: &mut SchemaRegistry) -> Result<u32, SerdeError> {
        let id = if self.auto_register {
            registry.register(&self.subject, &self.schema)
        } else {
            registry
                .lookup(&self.subject, &self.schema)
                .ok_or_else(|| SerdeError::NotRegistered {
                    subject: self.subject.clone(),
                })?
        };
        self.schema_id = Some(id);
        Ok(id)
    }

    /// Encode mapping ke framed bytes
    pub fn encode(
        &mut self,
        registry: &mut SchemaRegistry,
        value: &WireValue,
    ) -> Result<Vec<u8>, SerdeError> {
        let schema_id = self.resolve_schema_id(registry)?;

        let mut out = Vec::with_capacity(self.size_hint);
        FrameHeader::new(schema_id).write_to(&mut out);
        self.codec.encode(&self.schema, value, &mut out)?;

        self.size_hint = out.len();
        Ok(out)
    }

    /// Decode framed bytes ke mapping mentah.
    ///
    /// Schema diambil dari registry berdasarkan id di header, bukan dari
    /// schema pipeline.
    pub fn decode(&self, registry: &SchemaRegistry, bytes: &[u8]) -> Result<WireValue, SerdeError> {
        let (header, payload) = FrameHeader::parse(bytes)?;
        let schema = registry.resolve(header.schema_id)?;
        Ok(self.codec.decode(schema, payload)?)
    }
}
