//! Transport-ready stack frame records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{require_non_empty, CaptureError};
use crate::sanitize::SafeValue;

/// One frame of an event's stack trace, with its local variables (if any
/// were captured) already in transport-safe form.
///
/// Equality and hashing cover every field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosticStackElement {
    module: String,
    function: String,
    file_name: Option<String>,
    line_number: i32,
    column: Option<i32>,
    absolute_path: Option<String>,
    platform: Option<String>,
    variables: Option<BTreeMap<String, SafeValue>>,
}

impl DiagnosticStackElement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
        file_name: Option<String>,
        line_number: i32,
        column: Option<i32>,
        absolute_path: Option<String>,
        platform: Option<String>,
        variables: Option<BTreeMap<String, SafeValue>>,
    ) -> Result<Self, CaptureError> {
        let module = module.into();
        let function = function.into();
        require_non_empty("module", &module)?;
        require_non_empty("function", &function)?;
        Ok(Self {
            module,
            function,
            file_name,
            line_number,
            column,
            absolute_path,
            platform,
            variables,
        })
    }

    /// Build from an already-validated trace frame. Column, absolute path and
    /// platform are not known to the standard trace.
    pub(crate) fn from_parts(
        module: String,
        function: String,
        file_name: Option<String>,
        line_number: i32,
        variables: Option<BTreeMap<String, SafeValue>>,
    ) -> Self {
        Self {
            module,
            function,
            file_name,
            line_number,
            column: None,
            absolute_path: None,
            platform: None,
            variables,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn line_number(&self) -> i32 {
        self.line_number
    }

    pub fn column(&self) -> Option<i32> {
        self.column
    }

    pub fn absolute_path(&self) -> Option<&str> {
        self.absolute_path.as_deref()
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn variables(&self) -> Option<&BTreeMap<String, SafeValue>> {
        self.variables.as_ref()
    }
}

struct OptDisplay<'a, T>(&'a Option<T>);

impl<T: fmt::Display> fmt::Display for OptDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "'{value}'"),
            None => f.write_str("null"),
        }
    }
}

impl fmt::Display for DiagnosticStackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiagnosticStackElement{{module='{}', function='{}', file_name={}, line_number={}, column={}, absolute_path={}, platform={}, variables=",
            self.module,
            self.function,
            OptDisplay(&self.file_name),
            self.line_number,
            self.column.map_or_else(|| "null".to_string(), |c| c.to_string()),
            OptDisplay(&self.absolute_path),
            OptDisplay(&self.platform),
        )?;
        match &self.variables {
            Some(vars) => {
                f.write_str("{")?;
                for (idx, (name, value)) in vars.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str("}")?;
            }
            None => f.write_str("null")?,
        }
        f.write_str("}")
    }
}
