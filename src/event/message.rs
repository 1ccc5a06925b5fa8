use serde::{Deserialize, Serialize};

/// Interface name of the message section.
pub const MESSAGE_INTERFACE: &str = "sentry.interfaces.Message";

/// The original message pattern and its parameters.
///
/// Sending the pattern lets the aggregation service group events by template
/// ("{} failed to provide an email address") rather than by the formatted
/// text, which differs for every parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageSection {
    message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formatted: Option<String>,
}

impl MessageSection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            parameters: Vec::new(),
            formatted: None,
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.formatted = Some(formatted.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn formatted(&self) -> Option<&str> {
        self.formatted.as_deref()
    }
}
