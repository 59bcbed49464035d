//! Canonical Event Model
//!
//! Satu entity kanonik (`UserRegisteredEvent` + `Envelope`) dengan
//! kontrak dua arah:
//! - `to_wire`: typed event -> mapping primitive (deterministic)
//! - `from_wire`: mapping -> typed event, normalisasi di boundary
//!
//! Layer ini tidak melakukan I/O.

mod envelope;
mod event;
mod value;

pub use envelope::{Envelope, EnvelopeBuilder, DEFAULT_APP_NAME, DEFAULT_APP_VERSION};
pub use event::{SubscriptionType, UnknownSubscriptionType, UserRegisteredEvent};
pub use value::{millis_precision, WireValue};

/// Error saat rekonstruksi typed event dari wire mapping.
///
/// `field` berisi path lengkap, mis. `_envelope.parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("field `{field}`: invalid identifier {value:?}")]
    InvalidIdentifier { field: String, value: String },
    #[error("field `{field}`: invalid enumeration value {value:?}")]
    InvalidEnumeration { field: String, value: String },
    #[error("field `{field}`: invalid timestamp {value}")]
    InvalidTimestamp { field: String, value: i64 },
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Tipe yang punya bentuk wire kanonik.
///
/// Shape yang diharapkan oleh `from_wire` ditentukan oleh implementor.
pub trait WireRecord: Sized {
    fn to_wire(&self) -> WireValue;

    fn from_wire(value: &WireValue) -> Result<Self, ModelError>;
}
