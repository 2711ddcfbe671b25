//! Grants: `(privilege, object type label, target)` value triples.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::naming::pluralize;

/// A set of grants. Ordered only so that output is byte-stable.
pub type GrantSet = BTreeSet<Grant>;

/// Container level a future grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureScope {
    Database,
    Schema,
}

impl FutureScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "DATABASE",
            Self::Schema => "SCHEMA",
        }
    }
}

/// A privilege on a target. Equality is by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Grant {
    pub privilege: String,
    pub object_type: String,
    pub target: String,
}

impl Grant {
    /// Upper-cases the privilege and type label. The target is taken as-is
    /// and is expected to be canonical already.
    pub fn new(privilege: &str, object_type: &str, target: &str) -> Self {
        Self {
            privilege: privilege.to_uppercase(),
            object_type: object_type.to_uppercase(),
            target: target.to_string(),
        }
    }

    /// A future grant on `container`, e.g. `FUTURE TABLES IN SCHEMA` on `DB1.SCH1`.
    pub fn future(privilege: &str, type_label: &str, scope: FutureScope, container: &str) -> Self {
        Self {
            privilege: privilege.to_uppercase(),
            object_type: future_label(type_label, scope),
            target: container.to_string(),
        }
    }

    /// Role membership, modeled as `USAGE` on the role.
    pub fn role_membership(role: &str) -> Self {
        Self::new("USAGE", "ROLE", role)
    }

    pub fn is_future(&self) -> bool {
        self.object_type.starts_with("FUTURE ")
    }
}

/// `FUTURE <PLURAL> IN <SCOPE>`.
pub fn future_label(type_label: &str, scope: FutureScope) -> String {
    format!("FUTURE {} IN {}", pluralize(type_label).to_uppercase(), scope.as_str())
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ON {} {}", self.privilege, self.object_type, self.target)
    }
}

impl Serialize for Grant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.privilege, &self.object_type, &self.target).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Grant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (privilege, object_type, target) =
            <(String, String, String)>::deserialize(deserializer)?;
        Ok(Self {
            privilege,
            object_type,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_labels() {
        let g = Grant::future("select", "TABLE", FutureScope::Schema, "DB1.SCHEMA1");
        assert_eq!(g.object_type, "FUTURE TABLES IN SCHEMA");
        assert_eq!(g.target, "DB1.SCHEMA1");
        assert!(g.is_future());
        assert_eq!(future_label("SCHEMA", FutureScope::Database), "FUTURE SCHEMAS IN DATABASE");
        assert_eq!(
            future_label("MATERIALIZED VIEW", FutureScope::Schema),
            "FUTURE MATERIALIZED VIEWS IN SCHEMA"
        );
    }

    #[test]
    fn serializes_as_triple() {
        let g = Grant::new("select", "table", "DB1.SCH1.T1");
        assert_eq!(serde_json::to_string(&g).unwrap(), r#"["SELECT","TABLE","DB1.SCH1.T1"]"#);
    }
}
