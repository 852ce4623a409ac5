//! Typed values for open-ended extension maps.
//!
//! Trigger hooks, command arguments and event payloads carry parameters that
//! do not fit a fixed signature (an army type, a target city, a calendar
//! position). They are stored as [`AuxValue`]s keyed by name so callers read
//! them through typed accessors instead of downcasting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered key/value bag of [`AuxValue`]s.
pub type AuxMap = BTreeMap<String, AuxValue>;

/// One value in an [`AuxMap`].
///
/// Serialized untagged, so a map round-trips through plain JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuxValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Map(AuxMap),
}

impl AuxValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats and integers both read as `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&AuxMap> {
        match self {
            Self::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, used in log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Map(_) => "map",
        }
    }
}

impl fmt::Display for AuxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Map(v) => write!(f, "{{{} entries}}", v.len()),
        }
    }
}

impl From<bool> for AuxValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AuxValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AuxValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AuxValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AuxValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AuxValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<AuxMap> for AuxValue {
    fn from(value: AuxMap) -> Self {
        Self::Map(value)
    }
}

/// Typed lookups on an [`AuxMap`].
///
/// A key that is present with the wrong variant reads as `None`, same as a
/// missing key.
pub trait AuxMapExt {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn get_float(&self, key: &str) -> Option<f64>;
    fn get_str(&self, key: &str) -> Option<&str>;
    fn get_bool(&self, key: &str) -> Option<bool>;
}

impl AuxMapExt for AuxMap {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AuxValue::as_int)
    }

    fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AuxValue::as_float)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AuxValue::as_str)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AuxValue::as_bool)
    }
}

/// Builds an [`AuxMap`] from `key => value` pairs.
#[macro_export]
macro_rules! aux_map {
    () => { $crate::AuxMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::AuxMap::new();
        $( map.insert(::std::string::String::from($key), $crate::AuxValue::from($value)); )+
        map
    }};
}
