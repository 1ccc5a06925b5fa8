//! Diagnostic events sent to the aggregation service.
//!
//! An [`Event`] is only created through [`EventBuilder`] and is immutable once
//! built. Its identity is its id: two events with the same id are the same
//! event whatever their contents.

mod breadcrumb;
mod builder;
mod level;
mod message;

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::element::DiagnosticStackElement;
use crate::sanitize::{sanitize_map, Observed, SafeValue};

pub use breadcrumb::Breadcrumb;
pub use builder::{EventBuilder, DEFAULT_PLATFORM, SDK_NAME, SDK_VERSION};
pub use level::Level;
pub use message::{MessageSection, MESSAGE_INTERFACE};

/// Interface name of the stack trace section.
pub const STACKTRACE_INTERFACE: &str = "sentry.interfaces.Stacktrace";

/// The converted stack trace, innermost frame first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackTraceSection {
    frames: Vec<DiagnosticStackElement>,
}

impl StackTraceSection {
    pub fn new(frames: Vec<DiagnosticStackElement>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[DiagnosticStackElement] {
        &self.frames
    }
}

/// A named structured section of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section {
    Message(MessageSection),
    StackTrace(StackTraceSection),
}

impl Section {
    pub fn interface_name(&self) -> &'static str {
        match self {
            Section::Message(_) => MESSAGE_INTERFACE,
            Section::StackTrace(_) => STACKTRACE_INTERFACE,
        }
    }
}

/// Free-form values attached to an event. Values are kept as given and only
/// sanitized when the event is serialized.
#[derive(Clone, Default)]
pub struct Extra(BTreeMap<String, Arc<dyn Observed + Send + Sync>>);

impl Extra {
    pub fn get(&self, key: &str) -> Option<&(dyn Observed + Send + Sync)> {
        self.0.get(key).map(|value| &**value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// The transport-safe form of every entry.
    pub fn sanitized(&self) -> BTreeMap<String, SafeValue> {
        sanitize_map(
            self.0
                .iter()
                .map(|(key, value)| (key.as_str(), Some(&**value as &dyn Observed))),
        )
    }

    fn insert(&mut self, key: String, value: Arc<dyn Observed + Send + Sync>) {
        self.0.insert(key, value);
    }
}

impl fmt::Debug for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sanitized()).finish()
    }
}

impl Serialize for Extra {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.sanitized().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Extra {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = BTreeMap::<String, SafeValue>::deserialize(deserializer)?;
        Ok(Extra(
            values
                .into_iter()
                .map(|(key, value)| (key, Arc::new(value) as Arc<dyn Observed + Send + Sync>))
                .collect(),
        ))
    }
}

/// An immutable diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    message: Option<String>,
    timestamp: DateTime<Utc>,
    level: Option<Level>,
    logger: Option<String>,
    platform: String,
    sdk_name: String,
    sdk_version: String,
    culprit: Option<String>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    release: Option<String>,
    environment: Option<String>,
    server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Extra::is_empty")]
    extra: Extra,
    fingerprint: Option<Vec<String>>,
    checksum: Option<String>,
    #[serde(default)]
    sections: BTreeMap<String, Section>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    breadcrumbs: Vec<Breadcrumb>,
}

impl Event {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn sdk_name(&self) -> &str {
        &self.sdk_name
    }

    pub fn sdk_version(&self) -> &str {
        &self.sdk_version
    }

    pub fn culprit(&self) -> Option<&str> {
        self.culprit.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }

    pub fn fingerprint(&self) -> Option<&[String]> {
        self.fingerprint.as_deref()
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    pub fn sections(&self) -> &BTreeMap<String, Section> {
        &self.sections
    }

    /// Breadcrumbs leading up to the event, oldest first.
    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.breadcrumbs
    }

    pub fn stack_trace(&self) -> Option<&StackTraceSection> {
        match self.sections.get(STACKTRACE_INTERFACE)? {
            Section::StackTrace(section) => Some(section),
            Section::Message(_) => None,
        }
    }

    pub fn message_section(&self) -> Option<&MessageSection> {
        match self.sections.get(MESSAGE_INTERFACE)? {
            Section::Message(section) => Some(section),
            Section::StackTrace(_) => None,
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = self.level.map(|level| level.to_string());
        write!(
            f,
            "Event{{level={}, message='{}', logger='{}'}}",
            level.as_deref().unwrap_or("null"),
            self.message.as_deref().unwrap_or("null"),
            self.logger.as_deref().unwrap_or("null"),
        )
    }
}
