//! Stack trace and capture fixtures.

use std::fmt;
use std::path::{Path, PathBuf};

use stackvars::{CapturedFrame, LocalBinding, Observed, Routine, StackFrame};

/// A host type with no transport-safe form of its own.
pub struct Widget {
    pub id: u32,
}

impl fmt::Display for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Widget#{}", self.id)
    }
}

impl Observed for Widget {}

/// Build a trace from `(module, function, line)` triples, innermost first.
/// Each frame's file is `<module>.src`.
pub fn trace(frames: &[(&str, &str, i32)]) -> Vec<StackFrame> {
    frames
        .iter()
        .map(|(module, function, line)| {
            StackFrame::new(*module, *function, Some(format!("{module}.src")), *line)
                .expect("Invalid fixture frame")
        })
        .collect()
}

pub fn live<'a>(name: &str, value: &'a dyn Observed) -> LocalBinding<'a> {
    LocalBinding::live(name, "", None, Some(value))
}

pub fn captured<'a>(
    routine: &str,
    locals: Vec<Option<LocalBinding<'a>>>,
    line: i32,
) -> CapturedFrame<'a> {
    let routine: Routine = routine.parse().expect("Invalid fixture routine");
    CapturedFrame::new(routine, None, locals, Some(0), line)
}

/// Write a capture document into `dir` and return its path.
pub fn write_document(dir: &Path, document: &serde_json::Value) -> PathBuf {
    let path = dir.join("capture.json");
    let bytes = serde_json::to_vec_pretty(document).expect("Serialize document");
    std::fs::write(&path, bytes).expect("Write document");
    path
}
