//! Event Envelope - metadata identitas, lineage, dan timestamp

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::value::FieldReader;
use super::{ModelError, WireRecord, WireValue};

pub const DEFAULT_APP_NAME: &str = "serde_speed";
pub const DEFAULT_APP_VERSION: &str = "1.0.0";

const ENVELOPE_ID: &str = "envelope_id";
const PARENT_ID: &str = "parent_id";
const EVENT_TIMESTAMP: &str = "event_timestamp";
const APP_NAME: &str = "app_name";
const APP_VERSION: &str = "app_version";

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub envelope_id: Uuid,
    /// `envelope_id` dari pesan sebelumnya, kosong untuk pesan pertama
    pub parent_id: Option<Uuid>,
    pub event_timestamp: DateTime<Utc>,
    pub app_name: String,
    pub app_version: String,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    /// Envelope baru dengan id dan timestamp fresh
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EnvelopeBuilder {
        EnvelopeBuilder::default()
    }

    /// Sambungkan lineage: parent = `parent`, id baru.
    /// Timestamp dan info aplikasi tidak berubah.
    #[inline]
    pub fn relink(&mut self, parent: Uuid) {
        self.parent_id = Some(parent);
        self.envelope_id = Uuid::new_v4();
    }
}

/// Builder; field yang tidak di-set diisi value fresh saat `build`
#[derive(Debug, Default, Clone)]
pub struct EnvelopeBuilder {
    envelope_id: Option<Uuid>,
    parent_id: Option<Uuid>,
    event_timestamp: Option<DateTime<Utc>>,
    app_name: Option<String>,
    app_version: Option<String>,
}

impl EnvelopeBuilder {
    pub fn envelope_id(mut self, id: Uuid) -> Self {
        self.envelope_id = Some(id);
        self
    }

    pub fn parent_id(mut self, parent: Uuid) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn event_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.event_timestamp = Some(ts);
        self
    }

    pub fn app(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self.app_version = Some(version.into());
        self
    }

    pub fn build(self) -> Envelope {
        Envelope {
            envelope_id: self.envelope_id.unwrap_or_else(Uuid::new_v4),
            parent_id: self.parent_id,
            event_timestamp: self.event_timestamp.unwrap_or_else(Utc::now),
            app_name: self
                .app_name
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            app_version: self
                .app_version
                .unwrap_or_else(|| DEFAULT_APP_VERSION.to_string()),
        }
    }
}

impl Envelope {
    pub(crate) fn read(reader: &FieldReader<'_>) -> Result<Self, ModelError> {
        Ok(Self {
            envelope_id: reader.uuid(ENVELOPE_ID)?,
            parent_id: reader.optional_uuid(PARENT_ID)?,
            event_timestamp: reader.timestamp(EVENT_TIMESTAMP)?,
            app_name: reader.string(APP_NAME)?,
            app_version: reader.string(APP_VERSION)?,
        })
    }
}

impl WireRecord for Envelope {
    fn to_wire(&self) -> WireValue {
        let mut fields = BTreeMap::new();
        fields.insert(ENVELOPE_ID.to_string(), self.envelope_id.into());
        fields.insert(PARENT_ID.to_string(), self.parent_id.into());
        fields.insert(EVENT_TIMESTAMP.to_string(), self.event_timestamp.into());
        fields.insert(APP_NAME.to_string(), self.app_name.as_str().into());
        fields.insert(APP_VERSION.to_string(), self.app_version.as_str().into());
        WireValue::Record(fields)
    }

    fn from_wire(value: &WireValue) -> Result<Self, ModelError> {
        Self::read(&FieldReader::new(value, "")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::millis_precision;

    #[test]
    fn test_new_generates_fresh_values() {
        let a = Envelope::new();
        let b = Envelope::new();

        assert_ne!(a.envelope_id, b.envelope_id);
        assert_eq!(a.parent_id, None);
        assert_eq!(a.app_name, DEFAULT_APP_NAME);
        assert_eq!(a.app_version, DEFAULT_APP_VERSION);
    }

    #[test]
    fn test_builder_keeps_supplied_values() {
        let id = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let ts: DateTime<Utc> = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();

        let env = Envelope::builder()
            .envelope_id(id)
            .parent_id(parent)
            .event_timestamp(ts)
            .app("producer", "2.1.0")
            .build();

        assert_eq!(env.envelope_id, id);
        assert_eq!(env.parent_id, Some(parent));
        assert_eq!(env.event_timestamp, ts);
        assert_eq!(env.app_name, "producer");
        assert_eq!(env.app_version, "2.1.0");
    }

    #[test]
    fn test_relink() {
        let mut env = Envelope::new();
        let original = env.clone();
        let previous = Uuid::new_v4();

        env.relink(previous);

        assert_eq!(env.parent_id, Some(previous));
        assert_ne!(env.envelope_id, original.envelope_id);
        assert_eq!(env.event_timestamp, original.event_timestamp);
    }

    #[test]
    fn test_wire_round_trip() {
        let env = Envelope::builder().parent_id(Uuid::new_v4()).build();
        let wire = env.to_wire();

        assert!(matches!(wire.get(PARENT_ID), Some(WireValue::String(_))));
        assert!(matches!(wire.get(EVENT_TIMESTAMP), Some(WireValue::Long(_))));

        let back = Envelope::from_wire(&wire).unwrap();
        assert_eq!(back.envelope_id, env.envelope_id);
        assert_eq!(back.parent_id, env.parent_id);
        assert_eq!(back.event_timestamp, millis_precision(env.event_timestamp));
    }

    #[test]
    fn test_null_parent() {
        let wire = Envelope::new().to_wire();
        assert_eq!(wire.get(PARENT_ID), Some(&WireValue::Null));
        assert_eq!(Envelope::from_wire(&wire).unwrap().parent_id, None);
    }
}
