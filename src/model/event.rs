//! UserRegistered event - business event dengan satu envelope

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::envelope::Envelope;
use super::value::FieldReader;
use super::{ModelError, WireRecord, WireValue};

const USER_ID: &str = "user_id";
const USER_NAME: &str = "user_name";
const USER_LAST_NAME: &str = "user_last_name";
const IS_NEW_USER: &str = "is_new_user";
const SUBSCRIPTION_TYPE: &str = "subscription_type";
const REGISTRATION_TIMESTAMP: &str = "registration_timestamp";
const SCORE: &str = "score";
/// Envelope travels under this key on the wire
const ENVELOPE: &str = "_envelope";

/// Tipe subscription; hanya tiga literal ini yang representable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionType {
    Free,
    Lite,
    Pro,
}

impl SubscriptionType {
    pub const ALL: [SubscriptionType; 3] = [Self::Free, Self::Lite, Self::Pro];

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Lite => "LITE",
            Self::Pro => "PRO",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subscription type {0:?}")]
pub struct UnknownSubscriptionType(pub String);

impl FromStr for SubscriptionType {
    type Err = UnknownSubscriptionType;

    /// Exact match, case-sensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(Self::Free),
            "LITE" => Ok(Self::Lite),
            "PRO" => Ok(Self::Pro),
            other => Err(UnknownSubscriptionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRegisteredEvent {
    pub user_id: Uuid,
    pub user_name: String,
    pub user_last_name: String,
    pub is_new_user: bool,
    pub subscription_type: SubscriptionType,
    pub registration_timestamp: DateTime<Utc>,
    /// Tidak ada range yang valid, jadi tidak divalidasi
    pub score: f64,
    pub envelope: Envelope,
}

impl UserRegisteredEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        user_name: impl Into<String>,
        user_last_name: impl Into<String>,
        is_new_user: bool,
        subscription_type: SubscriptionType,
        registration_timestamp: DateTime<Utc>,
        score: f64,
        envelope: Envelope,
    ) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            user_last_name: user_last_name.into(),
            is_new_user,
            subscription_type,
            registration_timestamp,
            score,
            envelope,
        }
    }
}

impl WireRecord for UserRegisteredEvent {
    fn to_wire(&self) -> WireValue {
        let mut fields = BTreeMap::new();
        fields.insert(USER_ID.to_string(), self.user_id.into());
        fields.insert(USER_NAME.to_string(), self.user_name.as_str().into());
        fields.insert(USER_LAST_NAME.to_string(), self.user_last_name.as_str().into());
        fields.insert(IS_NEW_USER.to_string(), self.is_new_user.into());
        fields.insert(
            SUBSCRIPTION_TYPE.to_string(),
            self.subscription_type.as_str().into(),
        );
        fields.insert(
            REGISTRATION_TIMESTAMP.to_string(),
            self.registration_timestamp.into(),
        );
        fields.insert(SCORE.to_string(), self.score.into());
        fields.insert(ENVELOPE.to_string(), self.envelope.to_wire());
        WireValue::Record(fields)
    }

    /// Semua field divalidasi sebelum event dibuat; error apa pun berarti
    /// tidak ada event parsial.
    fn from_wire(value: &WireValue) -> Result<Self, ModelError> {
        let reader = FieldReader::new(value, "")?;
        let envelope_value = reader.record(ENVELOPE)?;
        let envelope = Envelope::read(&FieldReader::new(
            envelope_value,
            &reader.nested_path(ENVELOPE),
        )?)?;

        Ok(Self {
            user_id: reader.uuid(USER_ID)?,
            user_name: reader.string(USER_NAME)?,
            user_last_name: reader.string(USER_LAST_NAME)?,
            is_new_user: reader.boolean(IS_NEW_USER)?,
            subscription_type: reader.enumeration(SUBSCRIPTION_TYPE)?,
            registration_timestamp: reader.timestamp(REGISTRATION_TIMESTAMP)?,
            score: reader.double(SCORE)?,
            envelope,
        })
    }
}
