//! Canonical wire mapping
//!
//! `WireValue` hanya berisi primitive yang aman dikirim ke codec:
//! null, boolean, long, double, string, dan nested record.
//! Tidak ada tipe domain (Uuid, DateTime, enum) di sini.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ModelError;

#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    Record(BTreeMap<String, WireValue>),
}

impl WireValue {
    /// Nama jenis value untuk pesan error
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Boolean(_) => "boolean",
            WireValue::Long(_) => "long",
            WireValue::Double(_) => "double",
            WireValue::String(_) => "string",
            WireValue::Record(_) => "record",
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&BTreeMap<String, WireValue>> {
        match self {
            WireValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record_mut(&mut self) -> Option<&mut BTreeMap<String, WireValue>> {
        match self {
            WireValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Ambil field dari record, `None` untuk non-record
    #[inline]
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.as_record().and_then(|fields| fields.get(key))
    }
}

impl fmt::Display for WireValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireValue::Null => f.write_str("null"),
            WireValue::Boolean(b) => write!(f, "{b}"),
            WireValue::Long(n) => write!(f, "{n}"),
            WireValue::Double(x) => write!(f, "{x}"),
            WireValue::String(s) => write!(f, "{s:?}"),
            WireValue::Record(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for WireValue {
    fn from(v: bool) -> Self {
        WireValue::Boolean(v)
    }
}

impl From<i64> for WireValue {
    fn from(v: i64) -> Self {
        WireValue::Long(v)
    }
}

impl From<f64> for WireValue {
    fn from(v: f64) -> Self {
        WireValue::Double(v)
    }
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self {
        WireValue::String(v.to_string())
    }
}

impl From<String> for WireValue {
    fn from(v: String) -> Self {
        WireValue::String(v)
    }
}

impl From<Uuid> for WireValue {
    /// Selalu bentuk hyphenated 36 karakter
    fn from(v: Uuid) -> Self {
        WireValue::String(v.hyphenated().to_string())
    }
}

impl From<Option<Uuid>> for WireValue {
    fn from(v: Option<Uuid>) -> Self {
        v.map_or(WireValue::Null, WireValue::from)
    }
}

impl From<DateTime<Utc>> for WireValue {
    /// Milliseconds sejak epoch; presisi sub-millisecond hilang
    fn from(v: DateTime<Utc>) -> Self {
        WireValue::Long(v.timestamp_millis())
    }
}

/// Potong timestamp ke presisi millisecond (presisi yang survive di wire)
pub fn millis_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Reader untuk field record dengan konversi per tipe domain.
///
/// `prefix` menyimpan path nested (mis. `_envelope.`) untuk pesan error.
pub(crate) struct FieldReader<'a> {
    fields: &'a BTreeMap<String, WireValue>,
    prefix: String,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(value: &'a WireValue, path: &str) -> Result<Self, ModelError> {
        let fields = value.as_record().ok_or_else(|| ModelError::TypeMismatch {
            field: if path.is_empty() { "<root>".into() } else { path.into() },
            expected: "record",
            found: value.kind(),
        })?;
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}.")
        };
        Ok(Self { fields, prefix })
    }

    fn path(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    fn get(&self, name: &str) -> Result<&'a WireValue, ModelError> {
        self.fields
            .get(name)
            .ok_or_else(|| ModelError::MissingField(self.path(name)))
    }

    fn mismatch(&self, name: &str, expected: &'static str, found: &WireValue) -> ModelError {
        ModelError::TypeMismatch {
            field: self.path(name),
            expected,
            found: found.kind(),
        }
    }

    pub(crate) fn string(&self, name: &str) -> Result<String, ModelError> {
        match self.get(name)? {
            WireValue::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    pub(crate) fn boolean(&self, name: &str) -> Result<bool, ModelError> {
        match self.get(name)? {
            WireValue::Boolean(b) => Ok(*b),
            other => Err(self.mismatch(name, "boolean", other)),
        }
    }

    pub(crate) fn double(&self, name: &str) -> Result<f64, ModelError> {
        match self.get(name)? {
            WireValue::Double(x) => Ok(*x),
            other => Err(self.mismatch(name, "double", other)),
        }
    }

    /// Uuid hanya diterima dalam bentuk hyphenated 36 karakter
    pub(crate) fn uuid(&self, name: &str) -> Result<Uuid, ModelError> {
        match self.get(name)? {
            WireValue::String(raw) => parse_uuid(raw).ok_or_else(|| ModelError::InvalidIdentifier {
                field: self.path(name),
                value: raw.clone(),
            }),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    /// Field optional: tidak ada atau null -> `None`
    pub(crate) fn optional_uuid(&self, name: &str) -> Result<Option<Uuid>, ModelError> {
        match self.fields.get(name) {
            None | Some(WireValue::Null) => Ok(None),
            Some(_) => self.uuid(name).map(Some),
        }
    }

    pub(crate) fn timestamp(&self, name: &str) -> Result<DateTime<Utc>, ModelError> {
        match self.get(name)? {
            WireValue::Long(ms) => {
                let invalid = || ModelError::InvalidTimestamp {
                    field: self.path(name),
                    value: *ms,
                };
                if *ms < 0 {
                    return Err(invalid());
                }
                DateTime::from_timestamp_millis(*ms).ok_or_else(invalid)
            }
            other => Err(self.mismatch(name, "long", other)),
        }
    }

    pub(crate) fn enumeration<T: std::str::FromStr>(&self, name: &str) -> Result<T, ModelError> {
        match self.get(name)? {
            WireValue::String(raw) => raw.parse().map_err(|_| ModelError::InvalidEnumeration {
                field: self.path(name),
                value: raw.clone(),
            }),
            other => Err(self.mismatch(name, "string", other)),
        }
    }

    /// Masuk ke nested record
    pub(crate) fn record(&self, name: &str) -> Result<&'a WireValue, ModelError> {
        let value = self.get(name)?;
        match value {
            WireValue::Record(_) => Ok(value),
            other => Err(self.mismatch(name, "record", other)),
        }
    }

    pub(crate) fn nested_path(&self, name: &str) -> String {
        self.path(name)
    }
}

#[inline]
fn parse_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != 36 {
        return None;
    }
    Uuid::parse_str(raw).ok()
}
