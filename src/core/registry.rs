//! In-Process Schema Registry
//!
//! Mapping (subject, schema) -> id dan id -> schema.
//! State hidup selama satu proses benchmark, tidak pernah di-persist.
//!
//! Tidak ada locking internal: registry dipakai single-threaded. Kalau
//! variant dijalankan paralel, bungkus dengan `Mutex` karena alokasi id
//! (baca `next_id`, insert, increment) tidak atomic.

use std::collections::HashMap;

use super::schema::Schema;

/// Id pertama yang dialokasikan registry
pub const BASE_SCHEMA_ID: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown schema id {0}")]
    UnknownSchemaId(u32),
}

/// Registry schema dengan id monotonic
#[derive(Debug)]
pub struct SchemaRegistry {
    /// id -> schema
    schemas: HashMap<u32, Schema>,
    /// subject -> canonical form -> id
    subjects: HashMap<String, HashMap<String, u32>>,
    next_id: u32,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            subjects: HashMap::new(),
            next_id: BASE_SCHEMA_ID,
        }
    }

    /// Register schema di bawah subject.
    ///
    /// Idempotent: schema identik di subject yang sama mengembalikan id
    /// lama. Schema baru mendapat id berikutnya.
    pub fn register(&mut self, subject: &str, schema: &Schema) -> u32 {
        if let Some(id) = self.lookup(subject, schema) {
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;

        self.subjects
            .entry(subject.to_string())
            .or_default()
            .insert(schema.canonical_form().to_string(), id);
        self.schemas.insert(id, schema.clone());

        tracing::debug!(subject, schema_id = id, "registered schema");
        id
    }

    /// Cari id tanpa register
    pub fn lookup(&self, subject: &str, schema: &Schema) -> Option<u32> {
        self.subjects
            .get(subject)
            .and_then(|versions| versions.get(schema.canonical_form()))
            .copied()
    }

    /// Resolve id ke schema
    #[inline]
    pub fn resolve(&self, id: u32) -> Result<&Schema, RegistryError> {
        self.schemas.get(&id).ok_or(RegistryError::UnknownSchemaId(id))
    }

    /// Jumlah schema yang ter-register
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
