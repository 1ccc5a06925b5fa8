//! Correlating a standard stack trace with captured frames.
//!
//! The standard trace is authoritative for length and order. A capture buffer
//! is only attached when it has exactly one frame per trace frame; anything
//! else means the two sequences cannot be trusted to line up, and the trace is
//! converted without variables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capture::{thread_cache, CaptureBuffer, SanitizedBuffer};
use crate::config::CaptureConfig;
use crate::element::DiagnosticStackElement;
use crate::error::{require_non_empty, CaptureError};
use crate::sanitize::{sanitize_map, Observed, SafeValue};

/// One frame of the host's ordinary stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStackFrame")]
pub struct StackFrame {
    module: String,
    function: String,
    file_name: Option<String>,
    line_number: i32,
}

#[derive(Deserialize)]
struct RawStackFrame {
    module: String,
    function: String,
    #[serde(default)]
    file_name: Option<String>,
    line_number: i32,
}

impl TryFrom<RawStackFrame> for StackFrame {
    type Error = CaptureError;

    fn try_from(raw: RawStackFrame) -> Result<Self, Self::Error> {
        Self::new(raw.module, raw.function, raw.file_name, raw.line_number)
    }
}

impl StackFrame {
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
        file_name: Option<String>,
        line_number: i32,
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
        })
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

    fn to_element(&self, variables: Option<BTreeMap<String, SafeValue>>) -> DiagnosticStackElement {
        DiagnosticStackElement::from_parts(
            self.module.clone(),
            self.function.clone(),
            self.file_name.clone(),
            self.line_number,
            variables,
        )
    }
}

/// Merges standard stack traces with captured locals.
#[derive(Debug, Clone)]
pub struct SnapshotConverter {
    capture_locals: bool,
}

impl Default for SnapshotConverter {
    fn default() -> Self {
        Self {
            capture_locals: true,
        }
    }
}

impl SnapshotConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            capture_locals: config.locals,
        }
    }

    pub fn with_capture_locals(mut self, enabled: bool) -> Self {
        self.capture_locals = enabled;
        self
    }

    pub fn captures_locals(&self) -> bool {
        self.capture_locals
    }

    /// Convert `frames`, attaching locals from `capture` when it lines up
    /// one-to-one with the trace.
    pub fn convert(
        &self,
        frames: &[StackFrame],
        capture: Option<CaptureBuffer<'_>>,
    ) -> Vec<DiagnosticStackElement> {
        // Check alignment before sanitizing so a mismatched buffer costs nothing.
        let capture = capture.filter(|buffer| self.usable(frames.len(), buffer.len()));
        self.convert_sanitized(frames, capture.map(CaptureBuffer::sanitize))
    }

    /// Same as [`SnapshotConverter::convert`] for a capture that was sanitized
    /// up front.
    pub fn convert_sanitized(
        &self,
        frames: &[StackFrame],
        capture: Option<SanitizedBuffer>,
    ) -> Vec<DiagnosticStackElement> {
        match capture.filter(|buffer| self.usable(frames.len(), buffer.len())) {
            Some(buffer) => frames
                .iter()
                .zip(buffer.into_frames())
                .map(|(frame, variables)| frame.to_element(variables.filter(|v| !v.is_empty())))
                .collect(),
            None => frames.iter().map(|frame| frame.to_element(None)).collect(),
        }
    }

    /// Convert `frames` using whatever capture the current thread parked in
    /// [`thread_cache`]. The parked capture is consumed either way.
    pub fn convert_current_thread(&self, frames: &[StackFrame]) -> Vec<DiagnosticStackElement> {
        let capture = thread_cache::take();
        if capture.is_none() {
            tracing::trace!(frames = frames.len(), "No pending capture for this thread");
        }
        self.convert_sanitized(frames, capture)
    }

    /// Convert a single frame without variables.
    pub fn convert_frame(&self, frame: &StackFrame) -> DiagnosticStackElement {
        frame.to_element(None)
    }

    /// Convert a single frame with caller-supplied variables. The values are
    /// sanitized but otherwise taken as given.
    pub fn convert_frame_with_variables<'v, K, I>(
        &self,
        frame: &StackFrame,
        variables: Option<I>,
    ) -> DiagnosticStackElement
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Option<&'v dyn Observed>)>,
    {
        frame.to_element(variables.map(sanitize_map))
    }

    fn usable(&self, frames: usize, captured: usize) -> bool {
        if !self.capture_locals {
            tracing::trace!(frames, captured, "Local capture disabled; ignoring captured frames");
            return false;
        }
        if frames != captured {
            tracing::debug!(
                frames,
                captured,
                "Captured frames do not line up with the stack trace; dropping locals"
            );
            return false;
        }
        true
    }
}
