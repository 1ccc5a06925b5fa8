use std::fmt;

use crate::sanitize::{sanitize_opt, Observed, SafeValue};

/// One named variable observed in a captured frame.
///
/// A live binding had a value (possibly the runtime's null) at the moment of
/// capture; a dead binding only carries its declaration shape.
pub struct LocalBinding<'a> {
    name: String,
    declared_type: String,
    generic_type: Option<String>,
    live: bool,
    value: Option<&'a dyn Observed>,
}

impl<'a> LocalBinding<'a> {
    /// A binding whose value was available at capture time.
    pub fn live(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        generic_type: Option<String>,
        value: Option<&'a dyn Observed>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            generic_type,
            live: true,
            value,
        }
    }

    /// A binding that was out of scope (or optimized away) at capture time.
    pub fn dead(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        generic_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            generic_type,
            live: false,
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn generic_type(&self) -> Option<&str> {
        self.generic_type.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Always `None` for dead bindings.
    pub fn value(&self) -> Option<&'a dyn Observed> {
        self.value
    }

    /// The transport-safe form of this binding's value.
    pub fn sanitized_value(&self) -> SafeValue {
        sanitize_opt(self.value)
    }
}

impl fmt::Debug for LocalBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBinding")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("generic_type", &self.generic_type)
            .field("live", &self.live)
            .field("value", &self.value.map(|v| v.to_string()))
            .finish()
    }
}
