//! Transport-safe value coercion.
//!
//! Anything observed in a captured frame (or attached to an event's free-form
//! `extra` section) goes through [`sanitize`] before it can reach a record.
//! Values that know a transport-safe form of themselves keep it; everything
//! else is described as text. The mapping is shallow: each value is classified
//! on its own and no object graph is walked.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A value guaranteed to be encodable for transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SafeValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Only used for integers above `i64::MAX`.
    UInt(u64),
    /// Finite once it has gone through [`sanitize`]; non-finite floats are
    /// described as text.
    Float(f64),
    Text(String),
    List(Vec<SafeValue>),
    Map(BTreeMap<String, SafeValue>),
}

impl SafeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SafeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SafeValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            SafeValue::Int(n) => Some(n),
            SafeValue::UInt(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    fn as_i128(&self) -> Option<i128> {
        match *self {
            SafeValue::Int(n) => Some(i128::from(n)),
            SafeValue::UInt(n) => Some(i128::from(n)),
            _ => None,
        }
    }

    /// Wrap a float, describing non-finite values as text since they have no
    /// JSON encoding.
    pub fn from_float(value: f64) -> Self {
        if value.is_finite() {
            SafeValue::Float(value)
        } else {
            SafeValue::Text(value.to_string())
        }
    }

    /// Replace any non-finite `Float`, at any depth, by its text form.
    fn into_finite(self) -> Self {
        match self {
            SafeValue::Float(f) => SafeValue::from_float(f),
            SafeValue::List(items) => {
                SafeValue::List(items.into_iter().map(SafeValue::into_finite).collect())
            }
            SafeValue::Map(entries) => SafeValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into_finite()))
                    .collect(),
            ),
            other => other,
        }
    }
}

// Integers compare numerically across `Int`/`UInt`; floats compare by bit
// pattern so `Eq` and `Hash` stay lawful.
impl PartialEq for SafeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SafeValue::Null, SafeValue::Null) => true,
            (SafeValue::Bool(a), SafeValue::Bool(b)) => a == b,
            (SafeValue::Float(a), SafeValue::Float(b)) => a.to_bits() == b.to_bits(),
            (SafeValue::Text(a), SafeValue::Text(b)) => a == b,
            (SafeValue::List(a), SafeValue::List(b)) => a == b,
            (SafeValue::Map(a), SafeValue::Map(b)) => a == b,
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for SafeValue {}

impl Hash for SafeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            SafeValue::Null => state.write_u8(0),
            SafeValue::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            SafeValue::Int(_) | SafeValue::UInt(_) => {
                state.write_u8(2);
                self.as_i128().hash(state);
            }
            SafeValue::Float(f) => {
                state.write_u8(3);
                f.to_bits().hash(state);
            }
            SafeValue::Text(text) => {
                state.write_u8(4);
                text.hash(state);
            }
            SafeValue::List(items) => {
                state.write_u8(5);
                items.hash(state);
            }
            SafeValue::Map(entries) => {
                state.write_u8(6);
                entries.hash(state);
            }
        }
    }
}

impl fmt::Display for SafeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafeValue::Text(text) => f.write_str(text),
            other => {
                let json = serde_json::to_string(other).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for SafeValue {
    fn from(value: bool) -> Self {
        SafeValue::Bool(value)
    }
}

impl From<i64> for SafeValue {
    fn from(value: i64) -> Self {
        SafeValue::Int(value)
    }
}

impl From<u64> for SafeValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(n) => SafeValue::Int(n),
            Err(_) => SafeValue::UInt(value),
        }
    }
}

impl From<f64> for SafeValue {
    fn from(value: f64) -> Self {
        SafeValue::from_float(value)
    }
}

impl From<&str> for SafeValue {
    fn from(value: &str) -> Self {
        SafeValue::Text(value.to_string())
    }
}

impl From<String> for SafeValue {
    fn from(value: String) -> Self {
        SafeValue::Text(value)
    }
}

impl From<serde_json::Value> for SafeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => SafeValue::Null,
            Value::Bool(b) => SafeValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SafeValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    SafeValue::UInt(u)
                } else {
                    SafeValue::from_float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => SafeValue::Text(s),
            Value::Array(items) => SafeValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => {
                SafeValue::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// A value observed at capture time.
///
/// Implementors that can cross the transport boundary unchanged return their
/// safe form from [`Observed::transport_safe`]. The default is `None`, which
/// makes [`sanitize`] fall back to the `Display` text, so application types
/// only need an empty `impl Observed for MyType {}`.
pub trait Observed: fmt::Display {
    fn transport_safe(&self) -> Option<SafeValue> {
        None
    }
}

macro_rules! observed_signed {
    ($($ty:ty),*) => {
        $(impl Observed for $ty {
            fn transport_safe(&self) -> Option<SafeValue> {
                Some(SafeValue::Int(i64::from(*self)))
            }
        })*
    };
}

macro_rules! observed_unsigned {
    ($($ty:ty),*) => {
        $(impl Observed for $ty {
            fn transport_safe(&self) -> Option<SafeValue> {
                u64::try_from(*self).ok().map(SafeValue::from)
            }
        })*
    };
}

observed_signed!(i8, i16, i32, i64);
observed_unsigned!(u8, u16, u32, u64, usize, u128);

impl Observed for isize {
    fn transport_safe(&self) -> Option<SafeValue> {
        i64::try_from(*self).ok().map(SafeValue::Int)
    }
}

impl Observed for i128 {
    fn transport_safe(&self) -> Option<SafeValue> {
        if let Ok(n) = i64::try_from(*self) {
            return Some(SafeValue::Int(n));
        }
        u64::try_from(*self).ok().map(SafeValue::UInt)
    }
}

impl Observed for f32 {
    fn transport_safe(&self) -> Option<SafeValue> {
        self.is_finite().then(|| SafeValue::Float(f64::from(*self)))
    }
}

impl Observed for f64 {
    fn transport_safe(&self) -> Option<SafeValue> {
        self.is_finite().then_some(SafeValue::Float(*self))
    }
}

impl Observed for bool {
    fn transport_safe(&self) -> Option<SafeValue> {
        Some(SafeValue::Bool(*self))
    }
}

impl Observed for char {
    fn transport_safe(&self) -> Option<SafeValue> {
        Some(SafeValue::Text(self.to_string()))
    }
}

impl Observed for str {
    fn transport_safe(&self) -> Option<SafeValue> {
        Some(SafeValue::Text(self.to_string()))
    }
}

impl Observed for String {
    fn transport_safe(&self) -> Option<SafeValue> {
        Some(SafeValue::Text(self.clone()))
    }
}

impl Observed for SafeValue {
    fn transport_safe(&self) -> Option<SafeValue> {
        Some(self.clone().into_finite())
    }
}

impl Observed for serde_json::Value {
    fn transport_safe(&self) -> Option<SafeValue> {
        Some(SafeValue::from(self.clone()))
    }
}

impl<T: Observed + ?Sized> Observed for &T {
    fn transport_safe(&self) -> Option<SafeValue> {
        (**self).transport_safe()
    }
}

impl<T: Observed + ?Sized> Observed for Box<T> {
    fn transport_safe(&self) -> Option<SafeValue> {
        (**self).transport_safe()
    }
}

impl<T: Observed + ?Sized> Observed for Rc<T> {
    fn transport_safe(&self) -> Option<SafeValue> {
        (**self).transport_safe()
    }
}

impl<T: Observed + ?Sized> Observed for Arc<T> {
    fn transport_safe(&self) -> Option<SafeValue> {
        (**self).transport_safe()
    }
}

/// Coerce one observed value into its transport-safe form.
///
/// # Panics
///
/// Panics if the value's `Display` impl returns an error, the same way
/// [`ToString::to_string`] does.
pub fn sanitize(value: &dyn Observed) -> SafeValue {
    value
        .transport_safe()
        .unwrap_or_else(|| SafeValue::Text(value.to_string()))
}

/// Like [`sanitize`], mapping an absent value to [`SafeValue::Null`].
pub fn sanitize_opt(value: Option<&dyn Observed>) -> SafeValue {
    value.map_or(SafeValue::Null, sanitize)
}

/// Sanitize every entry of a name → value mapping.
pub fn sanitize_map<'a, K, I>(entries: I) -> BTreeMap<String, SafeValue>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Option<&'a dyn Observed>)>,
{
    entries
        .into_iter()
        .map(|(name, value)| (name.into(), sanitize_opt(value)))
        .collect()
}
