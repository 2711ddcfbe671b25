//! Loosely-typed result rows returned by the transport.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Placeholder written for values the persisted format cannot hold.
pub const UNREPRESENTABLE: &str = "<unrepresentable>";

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// A value that degraded during serialization.
    Unrepresentable,
}

impl RowValue {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret flag columns: booleans, `Y`/`YES`/`TRUE` text, or non-zero integers.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Text(s) => matches!(s.trim().to_ascii_uppercase().as_str(), "Y" | "YES" | "TRUE"),
            _ => false,
        }
    }

    /// Whether serializing this value loses it.
    pub fn degrades(&self) -> bool {
        match self {
            Self::Float(f) => !f.is_finite(),
            Self::Bytes(_) | Self::Unrepresentable => true,
            _ => false,
        }
    }
}

impl From<&str> for RowValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RowValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for RowValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for RowValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Float(_) | Self::Bytes(_) | Self::Unrepresentable => {
                serializer.serialize_str(UNREPRESENTABLE)
            }
        }
    }
}

impl<'de> Deserialize<'de> for RowValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowValueVisitor;

        impl<'de> Visitor<'de> for RowValueVisitor {
            type Value = RowValue;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a scalar column value")
            }

            fn visit_unit<E: de::Error>(self) -> Result<RowValue, E> {
                Ok(RowValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<RowValue, E> {
                Ok(RowValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<RowValue, E> {
                Ok(RowValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RowValue, E> {
                Ok(RowValue::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RowValue, E> {
                Ok(i64::try_from(v).map(RowValue::Int).unwrap_or(RowValue::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<RowValue, E> {
                Ok(RowValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RowValue, E> {
                if v == UNREPRESENTABLE {
                    Ok(RowValue::Unrepresentable)
                } else {
                    Ok(RowValue::Text(v.to_string()))
                }
            }
        }

        deserializer.deserialize_any(RowValueVisitor)
    }
}

/// One result row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    pub columns: BTreeMap<String, RowValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: &str, value: impl Into<RowValue>) -> Self {
        self.columns.insert(column.to_string(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&RowValue> {
        self.columns.get(column)
    }

    /// Text value of a column; `None` when absent, null, or not text.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(RowValue::as_text)
    }

    /// Flag value of a column; absent columns read as `false`.
    pub fn flag(&self, column: &str) -> bool {
        self.get(column).is_some_and(RowValue::is_truthy)
    }
}
