//! Call-stack capture model.
//!
//! The instrumentation layer builds one [`CaptureBuffer`] per exceptional
//! condition. Frames and bindings borrow the values they observed; the
//! borrow ends once the buffer has been converted (or sanitized into a
//! [`SanitizedBuffer`]).

pub mod binding;
pub mod buffer;
pub mod frame;
pub mod thread_cache;

pub use binding::LocalBinding;
pub use buffer::{CaptureBuffer, SanitizedBuffer};
pub use frame::{CapturedFrame, Routine, NO_LOCATION};
