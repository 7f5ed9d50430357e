//! Dynamically typed values exchanged with the script runtime.
//!
//! `Value` is what every field getter produces and every field setter
//! consumes.  It is deliberately small: scalars, strings, lists and string
//! keyed maps.  The same type doubles as the in-memory form of authored
//! configuration (widget layouts, camera nodes), which is why it derives
//! `Deserialize` in untagged form, so a RON document such as
//! `{ "range": [100, 20], "arrow_step": 5 }` maps straight onto it.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Builds an empty map value.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Inserts `key` when `self` is a map; no-op otherwise.  Returns `self`
    /// so literals can be chained in tests and builders.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Value::Map(m) = &mut self {
            m.insert(key.to_string(), value.into());
        }
        self
    }

    /// Short name of the runtime shape, used in error messages.
    pub fn kind(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Int(_) => "int".into(),
            Value::Decimal(_) => "decimal".into(),
            Value::String(_) => "string".into(),
            Value::List(items) => format!("list of {}", items.len()),
            Value::Map(_) => "map".into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers are accepted wherever a decimal is expected.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Map lookup; `None` for missing keys and for non-map values.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()?.get(key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // ── setter helpers ──────────────────────────────────────────────────────
    //
    // Field setters validate the incoming shape with these so that every
    // rejection carries the field name and its declared type tag.

    /// Integer that fits an `i32` (widget geometry, scroll positions).
    pub fn expect_i32(&self, field: &'static str) -> Result<i32, FieldError> {
        self.as_int()
            .and_then(|i| i32::try_from(i).ok())
            .ok_or_else(|| FieldError::mismatch(field, "int", self))
    }

    pub fn expect_decimal(&self, field: &'static str) -> Result<f64, FieldError> {
        self.as_decimal()
            .ok_or_else(|| FieldError::mismatch(field, "decimal", self))
    }

    /// A list of exactly `len` elements.
    pub fn expect_list(
        &self,
        field: &'static str,
        type_tag: &'static str,
        len: usize,
    ) -> Result<&[Value], FieldError> {
        match self.as_list() {
            Some(items) if items.len() == len => Ok(items),
            _ => Err(FieldError::mismatch(field, type_tag, self)),
        }
    }

    /// A `[decimal,decimal,decimal]` triple.
    pub fn expect_vec3(&self, field: &'static str) -> Result<Vec3, FieldError> {
        const TAG: &str = "[decimal,decimal,decimal]";
        let items = self.expect_list(field, TAG, 3)?;
        let mut out = [0.0f32; 3];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item
                .as_decimal()
                .ok_or_else(|| FieldError::mismatch(field, TAG, self))? as f32;
        }
        Ok(Vec3::from_array(out))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(d: f32) -> Self {
        Value::Decimal(d as f64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::List(vec![v.x.into(), v.y.into(), v.z.into()])
    }
}
