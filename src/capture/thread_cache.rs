//! Per-thread hand-off slot for instrumentation hooks.
//!
//! A hook that fires while an error is propagating cannot return its capture
//! to the code that later builds the event, so it parks the capture here. The
//! slot is thread-local: concurrent failures on different threads never see
//! each other's captures. Values are sanitized on the way in, so nothing
//! borrowed outlives the hook.

use std::cell::RefCell;

use crate::capture::buffer::{CaptureBuffer, SanitizedBuffer};

thread_local! {
    static PENDING: RefCell<Option<SanitizedBuffer>> = const { RefCell::new(None) };
}

/// Sanitize `buffer` and park it for the current thread, replacing any
/// capture that was never taken.
pub fn stash(buffer: CaptureBuffer<'_>) {
    stash_sanitized(buffer.sanitize());
}

/// Park an already-sanitized capture for the current thread.
pub fn stash_sanitized(buffer: SanitizedBuffer) {
    let frames = buffer.len();
    let replaced = PENDING.with(|slot| slot.borrow_mut().replace(buffer));
    if let Some(previous) = replaced {
        tracing::debug!(
            previous_frames = previous.len(),
            frames,
            "Replacing capture that was never consumed"
        );
    }
}

/// Remove and return the current thread's pending capture.
pub fn take() -> Option<SanitizedBuffer> {
    PENDING.with(|slot| slot.borrow_mut().take())
}

/// Drop the current thread's pending capture, if any.
pub fn clear() {
    drop(take());
}

pub fn has_pending() -> bool {
    PENDING.with(|slot| slot.borrow().is_some())
}
