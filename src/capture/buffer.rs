use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capture::frame::CapturedFrame;
use crate::sanitize::SafeValue;

/// Frames captured for one exceptional condition, innermost first.
///
/// A buffer is consumed by value, so it can only be merged once.
#[derive(Debug, Default)]
pub struct CaptureBuffer<'a> {
    frames: Vec<CapturedFrame<'a>>,
}

impl<'a> CaptureBuffer<'a> {
    pub fn new(frames: Vec<CapturedFrame<'a>>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[CapturedFrame<'a>] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<CapturedFrame<'a>> {
        self.frames
    }

    /// Sanitize every frame's named locals and release the borrowed values.
    pub fn sanitize(self) -> SanitizedBuffer {
        let frames = self
            .frames
            .iter()
            .map(CapturedFrame::sanitized_locals)
            .collect();
        SanitizedBuffer::new(frames)
    }
}

impl<'a> FromIterator<CapturedFrame<'a>> for CaptureBuffer<'a> {
    fn from_iter<I: IntoIterator<Item = CapturedFrame<'a>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// An owned capture buffer whose values have already been sanitized.
///
/// Holds one entry per captured frame: the frame's named locals, or `None`
/// when it had none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedBuffer {
    frames: Vec<Option<BTreeMap<String, SafeValue>>>,
}

impl SanitizedBuffer {
    pub fn new(frames: Vec<Option<BTreeMap<String, SafeValue>>>) -> Self {
        let frames = frames
            .into_iter()
            .map(|vars| vars.filter(|vars| !vars.is_empty()))
            .collect();
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Option<BTreeMap<String, SafeValue>>] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Option<BTreeMap<String, SafeValue>>> {
        self.frames
    }
}
