//! Securable objects as stored in the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::object_type::ObjectType;
use super::row::RowValue;

/// Classification flags lifted out of the inventory row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectFlags {
    /// Database kind (`STANDARD`, `IMPORTED DATABASE`, `APPLICATION`).
    pub kind: Option<String>,
    pub builtin: bool,
    pub external: bool,
    pub materialized: bool,
    /// Stage type (`INTERNAL`, `EXTERNAL`, ...).
    pub stage_type: Option<String>,
}

/// A resource privileges can be granted on.
///
/// Identity is `(object_type, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurableObject {
    pub object_type: ObjectType,
    /// Canonical qualified name.
    pub name: String,
    /// Owning database, resolved through the type's owner field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Owning schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub flags: ObjectFlags,
    /// The full inventory row, kept for the cache record.
    #[serde(default)]
    pub attributes: BTreeMap<String, RowValue>,
}

impl SecurableObject {
    pub fn new(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self {
            object_type,
            name: name.into(),
            database: None,
            schema: None,
            flags: ObjectFlags::default(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn in_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_flags(mut self, flags: ObjectFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Same object re-filed under a derived bucket.
    pub fn retyped(&self, object_type: ObjectType) -> Self {
        Self {
            object_type,
            ..self.clone()
        }
    }
}
