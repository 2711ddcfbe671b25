//! Access configuration: profiles, role-to-profile bindings, user-to-role
//! assignments.
//!
//! ```yaml
//! profiles:
//!   analyst:
//!     privileges:
//!       table:
//!         read: ["{db}.REPORTING.*"]
//! roles:
//!   ANALYST_EU:
//!     profiles:
//!       - analyst: { db: SALES_EU }
//! users:
//!   ALICE:
//!     roles: [ANALYST_EU]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::tables::PrivilegeTables;
use crate::types::ObjectType;

/// Object type keys that never touch the catalog.
pub const ROLE_KEY: &str = "role";

/// A list of name patterns; a single string is accepted as a one-item list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct PatternList(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for PatternList {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => Self(vec![s]),
            OneOrMany::Many(v) => Self(v),
        }
    }
}

/// A reusable, parameterized declaration of privilege groups on name patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    /// objectType → privilegeGroupName → patterns.
    #[serde(default)]
    pub privileges: BTreeMap<String, BTreeMap<String, PatternList>>,
}

/// A scalar profile parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum ParamValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl ParamValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(i) => i.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// One profile applied to a role, with its parameter bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBinding {
    pub profile: String,
    pub params: BTreeMap<String, String>,
}

/// Profiles associated with a role, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoleConfig {
    #[serde(default, deserialize_with = "deserialize_bindings")]
    pub profiles: Vec<ProfileBinding>,
}

/// `[{profileName: {param: value}}]` → bindings. Each list item may bind
/// several profiles; a profile with no parameters may be written as a bare
/// name.
fn deserialize_bindings<'de, D>(deserializer: D) -> Result<Vec<ProfileBinding>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Item {
        Bare(String),
        Bound(BTreeMap<String, Option<BTreeMap<String, ParamValue>>>),
    }

    let items = Vec::<Item>::deserialize(deserializer)?;
    let mut bindings = Vec::new();
    for item in items {
        match item {
            Item::Bare(profile) => bindings.push(ProfileBinding {
                profile,
                params: BTreeMap::new(),
            }),
            Item::Bound(map) => {
                for (profile, params) in map {
                    let params = params
                        .unwrap_or_default()
                        .into_iter()
                        .map(|(k, v)| (k, v.into_string()))
                        .collect();
                    bindings.push(ProfileBinding { profile, params });
                }
            }
        }
    }
    Ok(bindings)
}

/// Roles a user should hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The whole access configuration for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub profiles: BTreeMap<String, RoleProfile>,
    #[serde(default)]
    pub roles: BTreeMap<String, RoleConfig>,
    #[serde(default)]
    pub users: BTreeMap<String, UserConfig>,
}

impl AccessConfig {
    /// Parse from YAML (JSON is accepted too).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, "<string>")
    }

    /// Load from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Check every cross-reference before any plan is computed: role →
    /// profile, profile → object type, profile → privilege group.
    pub fn validate(&self, tables: &PrivilegeTables) -> Result<(), ConfigError> {
        for (role, config) in &self.roles {
            for binding in &config.profiles {
                if !self.profiles.contains_key(&binding.profile) {
                    return Err(ConfigError::UnknownProfile {
                        role: role.clone(),
                        profile: binding.profile.clone(),
                    });
                }
            }
        }

        for (name, profile) in &self.profiles {
            for (type_key, groups) in &profile.privileges {
                if type_key == ROLE_KEY {
                    continue;
                }
                let object_type = type_key
                    .parse::<ObjectType>()
                    .ok()
                    .filter(|t| tables.label(*t).is_some())
                    .ok_or_else(|| ConfigError::UnknownObjectType {
                        profile: name.clone(),
                        object_type: type_key.clone(),
                    })?;
                for group in groups.keys() {
                    if !tables.has_group(object_type, group) {
                        return Err(ConfigError::UnknownPrivilegeGroup {
                            profile: name.clone(),
                            object_type: type_key.clone(),
                            group: group.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Roles to plan: all configured roles, or the selected subset.
    pub fn select_roles(&self, selection: Option<&[String]>) -> Result<Vec<String>, ConfigError> {
        match selection {
            None => Ok(self.roles.keys().cloned().collect()),
            Some(names) => {
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    if !self.roles.contains_key(name) {
                        return Err(ConfigError::UnknownRole { role: name.clone() });
                    }
                    if !selected.contains(name) {
                        selected.push(name.clone());
                    }
                }
                selected.sort();
                Ok(selected)
            }
        }
    }
}
