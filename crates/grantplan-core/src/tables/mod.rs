//! Static privilege tables: type aliases, privilege groups, unsupported pairs.
//!
//! Loaded once per run into an immutable `PrivilegeTables` and passed by
//! reference to every component that needs them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::types::ObjectType;

const BUILTIN_TABLES: &str = include_str!("builtin.toml");

/// On-disk shape of a tables document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TablesFile {
    aliases: BTreeMap<String, String>,
    groups: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    unsupported: Vec<(String, String)>,
}

/// The immutable privilege vocabulary for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeTables {
    aliases: BTreeMap<ObjectType, String>,
    groups: BTreeMap<ObjectType, BTreeMap<String, Vec<String>>>,
    unsupported: BTreeSet<(String, String)>,
}

impl PrivilegeTables {
    /// The tables compiled into the binary.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml_at(BUILTIN_TABLES, "<builtin>")
    }

    /// Parse a complete tables document.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Self::from_toml_at(toml_str, "<string>")
    }

    /// Builtin tables with an override document layered on top: aliases and
    /// groups are replaced per key, unsupported pairs are added.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut tables = Self::builtin()?;
        if !path.exists() {
            return Ok(tables);
        }
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let overrides = Self::from_toml_at(&content, &path.display().to_string())?;
        tables.aliases.extend(overrides.aliases);
        for (object_type, groups) in overrides.groups {
            tables.groups.entry(object_type).or_default().extend(groups);
        }
        tables.unsupported.extend(overrides.unsupported);
        Ok(tables)
    }

    fn from_toml_at(toml_str: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: TablesFile = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let parse_type = |key: &str, field: &str| {
            key.parse::<ObjectType>().map_err(|e| ConfigError::InvalidValue {
                field: format!("{field}.{key}"),
                message: e.to_string(),
            })
        };

        let mut aliases = BTreeMap::new();
        for (key, label) in file.aliases {
            aliases.insert(parse_type(&key, "aliases")?, label.to_uppercase());
        }

        let mut groups = BTreeMap::new();
        for (key, table) in file.groups {
            let verbs = table
                .into_iter()
                .map(|(group, verbs)| (group, verbs.iter().map(|v| v.to_uppercase()).collect()))
                .collect();
            groups.insert(parse_type(&key, "groups")?, verbs);
        }

        let unsupported = file
            .unsupported
            .into_iter()
            .map(|(verb, label)| (verb.to_uppercase(), label.to_uppercase()))
            .collect();

        Ok(Self {
            aliases,
            groups,
            unsupported,
        })
    }

    /// Public-facing grant label for a type; `None` means the type is unknown
    /// to this vocabulary and must be skipped.
    pub fn label(&self, object_type: ObjectType) -> Option<&str> {
        self.aliases.get(&object_type).map(String::as_str)
    }

    /// Resolve a raw type label reported by the remote system.
    pub fn resolve(&self, raw: &str) -> Option<(ObjectType, &str)> {
        let object_type = raw.parse::<ObjectType>().ok()?;
        self.label(object_type).map(|label| (object_type, label))
    }

    /// Concrete verbs of a privilege group.
    pub fn verbs(&self, object_type: ObjectType, group: &str) -> Option<&[String]> {
        self.groups
            .get(&object_type)
            .and_then(|groups| groups.get(group))
            .map(Vec::as_slice)
    }

    /// Whether a privilege group exists for a type.
    pub fn has_group(&self, object_type: ObjectType, group: &str) -> bool {
        self.verbs(object_type, group).is_some()
    }

    /// Whether `(verb, label)` is excluded from every output.
    pub fn is_unsupported(&self, verb: &str, label: &str) -> bool {
        self.unsupported.contains(&(verb.to_string(), label.to_string()))
    }
}
