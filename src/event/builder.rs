use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::EventConfig;
use crate::element::DiagnosticStackElement;
use crate::error::CaptureError;
use crate::sanitize::Observed;

use super::{
    Breadcrumb, Event, Extra, Level, MessageSection, Section, StackTraceSection, MESSAGE_INTERFACE,
    STACKTRACE_INTERFACE,
};

pub const SDK_NAME: &str = env!("CARGO_PKG_NAME");
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_PLATFORM: &str = "other";

/// Accumulates event data; [`EventBuilder::build`] publishes it once.
#[derive(Debug)]
pub struct EventBuilder {
    id: Uuid,
    message: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    level: Option<Level>,
    logger: Option<String>,
    platform: Option<String>,
    culprit: Option<String>,
    tags: BTreeMap<String, String>,
    release: Option<String>,
    environment: Option<String>,
    server_name: Option<String>,
    extra: Extra,
    fingerprint: Option<Vec<String>>,
    checksum: Option<String>,
    sections: BTreeMap<String, Section>,
    breadcrumbs: Vec<Breadcrumb>,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuilder {
    /// Start an event with a fresh random id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            message: None,
            timestamp: None,
            level: None,
            logger: None,
            platform: None,
            culprit: None,
            tags: BTreeMap::new(),
            release: None,
            environment: None,
            server_name: None,
            extra: Extra::default(),
            fingerprint: None,
            checksum: None,
            sections: BTreeMap::new(),
            breadcrumbs: Vec::new(),
        }
    }

    /// Start an event with a caller-chosen id.
    pub fn with_id(id: Uuid) -> Result<Self, CaptureError> {
        if id.is_nil() {
            return Err(CaptureError::NilEventId);
        }
        let mut builder = Self::new();
        builder.id = id;
        Ok(builder)
    }

    /// Start an event pre-filled with the configured defaults.
    pub fn from_config(config: &EventConfig) -> Self {
        let mut builder = Self::new();
        builder.platform = Some(config.platform.clone());
        builder.logger = config.logger.clone();
        builder.release = config.release.clone();
        builder.environment = config.environment.clone();
        builder.server_name = config.server_name.clone();
        builder
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_culprit(mut self, culprit: impl Into<String>) -> Self {
        self.culprit = Some(culprit.into());
        self
    }

    /// Use `frame` as the culprit: `module.function(file:line)`.
    pub fn with_culprit_frame(self, frame: &DiagnosticStackElement) -> Self {
        self.with_culprit(culprit_of(frame))
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = Some(server_name.into());
        self
    }

    /// Attach a free-form value. Anything implementing [`Observed`] is
    /// accepted; it is sanitized when the event is serialized.
    pub fn with_extra<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: Observed + Send + Sync + 'static,
    {
        self.extra.insert(key.into(), Arc::new(value));
        self
    }

    pub fn with_fingerprint<I, S>(mut self, fingerprint: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fingerprint = Some(fingerprint.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_message_section(mut self, section: MessageSection) -> Self {
        self.sections
            .insert(MESSAGE_INTERFACE.to_string(), Section::Message(section));
        self
    }

    /// Append a breadcrumb. Breadcrumbs keep the order they were added in.
    pub fn with_breadcrumb(mut self, breadcrumb: Breadcrumb) -> Self {
        self.breadcrumbs.push(breadcrumb);
        self
    }

    pub fn with_stack_trace(mut self, frames: Vec<DiagnosticStackElement>) -> Self {
        self.sections.insert(
            STACKTRACE_INTERFACE.to_string(),
            Section::StackTrace(StackTraceSection::new(frames)),
        );
        self
    }

    /// Publish the event. Missing timestamp and platform are filled in, and
    /// the culprit defaults to the innermost stack frame.
    pub fn build(self) -> Event {
        let culprit = self.culprit.or_else(|| {
            match self.sections.get(STACKTRACE_INTERFACE) {
                Some(Section::StackTrace(trace)) => trace.frames().first().map(culprit_of),
                _ => None,
            }
        });

        let event = Event {
            id: self.id,
            message: self.message,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            level: self.level,
            logger: self.logger,
            platform: self
                .platform
                .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            sdk_name: SDK_NAME.to_string(),
            sdk_version: SDK_VERSION.to_string(),
            culprit,
            tags: self.tags,
            release: self.release,
            environment: self.environment,
            server_name: self.server_name,
            extra: self.extra,
            fingerprint: self.fingerprint,
            checksum: self.checksum,
            sections: self.sections,
            breadcrumbs: self.breadcrumbs,
        };
        tracing::debug!(
            event_id = %event.id,
            level = ?event.level,
            sections = event.sections.len(),
            "Built event"
        );
        event
    }
}

fn culprit_of(frame: &DiagnosticStackElement) -> String {
    let mut culprit = format!("{}.{}", frame.module(), frame.function());
    match frame.file_name() {
        Some(file) if frame.line_number() >= 0 => {
            culprit.push_str(&format!("({file}:{})", frame.line_number()));
        }
        Some(file) => culprit.push_str(&format!("({file})")),
        None => {}
    }
    culprit
}
