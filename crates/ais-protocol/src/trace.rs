//! Input trace
//!
//! Every encode returns the field values it actually placed on the wire, in
//! layout order, so external validation tools can compare a decoder's output
//! against what was sent.

use std::fmt;

/// A single traced field value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum TraceValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Field carried its not-available sentinel
    NotAvailable,
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceValue::Unsigned(v) => write!(f, "{v}"),
            TraceValue::Signed(v) => write!(f, "{v}"),
            TraceValue::Float(v) => write!(f, "{v}"),
            TraceValue::Text(v) => write!(f, "{v:?}"),
            TraceValue::Bool(v) => write!(f, "{v}"),
            TraceValue::NotAvailable => f.write_str("n/a"),
        }
    }
}

impl From<u64> for TraceValue {
    fn from(v: u64) -> Self {
        TraceValue::Unsigned(v)
    }
}

impl From<u32> for TraceValue {
    fn from(v: u32) -> Self {
        TraceValue::Unsigned(u64::from(v))
    }
}

impl From<u16> for TraceValue {
    fn from(v: u16) -> Self {
        TraceValue::Unsigned(u64::from(v))
    }
}

impl From<u8> for TraceValue {
    fn from(v: u8) -> Self {
        TraceValue::Unsigned(u64::from(v))
    }
}

impl From<i64> for TraceValue {
    fn from(v: i64) -> Self {
        TraceValue::Signed(v)
    }
}

impl From<i32> for TraceValue {
    fn from(v: i32) -> Self {
        TraceValue::Signed(i64::from(v))
    }
}

impl From<f64> for TraceValue {
    fn from(v: f64) -> Self {
        TraceValue::Float(v)
    }
}

impl From<bool> for TraceValue {
    fn from(v: bool) -> Self {
        TraceValue::Bool(v)
    }
}

impl From<&str> for TraceValue {
    fn from(v: &str) -> Self {
        TraceValue::Text(v.to_string())
    }
}

impl From<String> for TraceValue {
    fn from(v: String) -> Self {
        TraceValue::Text(v)
    }
}

impl<T: Into<TraceValue>> From<Option<T>> for TraceValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(TraceValue::NotAvailable, Into::into)
    }
}

/// Ordered field name to value record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTrace {
    fields: Vec<(&'static str, TraceValue)>,
}

impl InputTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field, replacing an earlier value of the same name
    pub fn record(&mut self, name: &'static str, value: impl Into<TraceValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&TraceValue> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TraceValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }
}

impl fmt::Display for InputTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for InputTrace {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
