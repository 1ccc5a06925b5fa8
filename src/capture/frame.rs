use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::capture::binding::LocalBinding;
use crate::error::{require_non_empty, CaptureError};
use crate::sanitize::{Observed, SafeValue};

/// Raw location value meaning "no instruction index" (e.g. a native frame).
pub const NO_LOCATION: i64 = -1;

/// The routine a frame was executing, resolved to names at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Routine {
    module: String,
    function: String,
}

impl Routine {
    pub fn new(
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> Result<Self, CaptureError> {
        let module = module.into();
        let function = function.into();
        require_non_empty("module", &module)?;
        require_non_empty("function", &function)?;
        Ok(Self { module, function })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl FromStr for Routine {
    type Err = CaptureError;

    /// Parse `module.function`, splitting on the last `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, function) = s
            .rsplit_once('.')
            .ok_or_else(|| CaptureError::InvalidRoutine(s.to_string()))?;
        if module.is_empty() || function.is_empty() {
            return Err(CaptureError::InvalidRoutine(s.to_string()));
        }
        Self::new(module, function)
    }
}

impl fmt::Display for Routine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.function)
    }
}

/// Snapshot of one call frame.
///
/// The receiver and every live value are borrowed for `'a`; a frame can never
/// outlive the values it observed.
pub struct CapturedFrame<'a> {
    routine: Routine,
    receiver: Option<&'a dyn Observed>,
    locals: Box<[Option<LocalBinding<'a>>]>,
    location: Option<u32>,
    line_number: i32,
    /// name -> slot index in `locals`
    named_locals: BTreeMap<String, usize>,
}

impl<'a> CapturedFrame<'a> {
    pub fn new(
        routine: Routine,
        receiver: Option<&'a dyn Observed>,
        locals: Vec<Option<LocalBinding<'a>>>,
        location: Option<u32>,
        line_number: i32,
    ) -> Self {
        let locals = locals.into_boxed_slice();
        let named_locals = index_named_locals(&locals);
        Self {
            routine,
            receiver,
            locals,
            location,
            line_number,
            named_locals,
        }
    }

    /// Like [`CapturedFrame::new`], taking the location as reported by the
    /// instrumentation layer where [`NO_LOCATION`] (or any negative or
    /// out-of-range value) means "no instruction index".
    pub fn from_raw_location(
        routine: Routine,
        receiver: Option<&'a dyn Observed>,
        locals: Vec<Option<LocalBinding<'a>>>,
        location: i64,
        line_number: i32,
    ) -> Self {
        Self::new(
            routine,
            receiver,
            locals,
            u32::try_from(location).ok(),
            line_number,
        )
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn receiver(&self) -> Option<&'a dyn Observed> {
        self.receiver
    }

    /// All slots, in capture order. Empty slots are `None`.
    pub fn locals(&self) -> &[Option<LocalBinding<'a>>] {
        &self.locals
    }

    pub fn location(&self) -> Option<u32> {
        self.location
    }

    pub fn location_raw(&self) -> i64 {
        self.location.map_or(NO_LOCATION, i64::from)
    }

    pub fn line_number(&self) -> i32 {
        self.line_number
    }

    pub fn has_named_locals(&self) -> bool {
        !self.named_locals.is_empty()
    }

    /// Bindings by name, in name order. When several slots share a name the
    /// last one wins.
    pub fn named_locals(&self) -> impl Iterator<Item = (&str, &LocalBinding<'a>)> + '_ {
        self.named_locals
            .iter()
            .filter_map(|(name, &slot)| Some((name.as_str(), self.locals[slot].as_ref()?)))
    }

    pub fn named_local(&self, name: &str) -> Option<&LocalBinding<'a>> {
        let slot = *self.named_locals.get(name)?;
        self.locals[slot].as_ref()
    }

    /// Sanitized values of the named locals, or `None` when there are none.
    pub fn sanitized_locals(&self) -> Option<BTreeMap<String, SafeValue>> {
        if self.named_locals.is_empty() {
            return None;
        }
        Some(
            self.named_locals()
                .map(|(name, binding)| (name.to_string(), binding.sanitized_value()))
                .collect(),
        )
    }
}

fn index_named_locals(locals: &[Option<LocalBinding<'_>>]) -> BTreeMap<String, usize> {
    let mut named = BTreeMap::new();
    for (slot, binding) in locals.iter().enumerate() {
        if let Some(binding) = binding {
            named.insert(binding.name().to_string(), slot);
        }
    }
    named
}

impl fmt::Debug for CapturedFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("routine", &self.routine)
            .field("receiver", &self.receiver.map(|r| r.to_string()))
            .field("locals", &self.locals)
            .field("location", &self.location_raw())
            .field("line_number", &self.line_number)
            .finish()
    }
}
