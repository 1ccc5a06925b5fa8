//! Capture call stacks and their local variables at the point of failure and
//! turn them into transport-safe diagnostic records.
//!
//! The pipeline is: the instrumentation layer fills a [`CaptureBuffer`], the
//! caller obtains the ordinary stack trace as [`StackFrame`]s, and
//! [`SnapshotConverter`] merges the two into [`DiagnosticStackElement`]s whose
//! values went through [`sanitize`](sanitize::sanitize). The result is
//! attached to an [`Event`].

pub mod capture;
pub mod config;
pub mod convert;
pub mod element;
pub mod error;
pub mod event;
pub mod sanitize;
pub mod util;

pub use capture::{
    thread_cache, CaptureBuffer, CapturedFrame, LocalBinding, Routine, SanitizedBuffer,
};
pub use config::{CaptureConfig, Config, ConfigError, ConfigWarning, EventConfig};
pub use convert::{SnapshotConverter, StackFrame};
pub use element::DiagnosticStackElement;
pub use error::CaptureError;
pub use event::{
    Breadcrumb, Event, EventBuilder, Level, MessageSection, Section, StackTraceSection,
};
pub use sanitize::{sanitize, sanitize_map, sanitize_opt, Observed, SafeValue};
