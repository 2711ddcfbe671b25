//! Securable object types, their inventory shape, and their container rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every object type the engine knows about.
///
/// The serialized form is the catalog bucket key (`"materialized view"`),
/// which is also the key profile authors write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectType {
    #[serde(rename = "account")]
    Account,
    #[serde(rename = "role")]
    Role,
    #[serde(rename = "warehouse")]
    Warehouse,
    #[serde(rename = "integration")]
    Integration,
    #[serde(rename = "database")]
    Database,
    #[serde(rename = "shared database")]
    SharedDatabase,
    #[serde(rename = "application database")]
    ApplicationDatabase,
    #[serde(rename = "schema")]
    Schema,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "external table")]
    ExternalTable,
    #[serde(rename = "view")]
    View,
    #[serde(rename = "materialized view")]
    MaterializedView,
    #[serde(rename = "stage")]
    Stage,
    #[serde(rename = "internal stage")]
    InternalStage,
    #[serde(rename = "external stage")]
    ExternalStage,
    #[serde(rename = "file format")]
    FileFormat,
    #[serde(rename = "sequence")]
    Sequence,
    #[serde(rename = "stream")]
    Stream,
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "pipe")]
    Pipe,
    #[serde(rename = "function")]
    Function,
    #[serde(rename = "procedure")]
    Procedure,
}

/// Which inventory column names the database that owns an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerField {
    /// Callables report their database as `catalog_name`.
    CatalogName,
    /// A database owns itself.
    Name,
    /// Everything schema-scoped reports `database_name`.
    DatabaseName,
    /// Account-level objects have no owning container.
    Exempt,
}

impl ObjectType {
    /// Every variant, in declaration order.
    pub const ALL: &'static [ObjectType] = &[
        Self::Account,
        Self::Role,
        Self::Warehouse,
        Self::Integration,
        Self::Database,
        Self::SharedDatabase,
        Self::ApplicationDatabase,
        Self::Schema,
        Self::Table,
        Self::ExternalTable,
        Self::View,
        Self::MaterializedView,
        Self::Stage,
        Self::InternalStage,
        Self::ExternalStage,
        Self::FileFormat,
        Self::Sequence,
        Self::Stream,
        Self::Task,
        Self::Pipe,
        Self::Function,
        Self::Procedure,
    ];

    /// Types inventoried directly from the remote system. Derived buckets
    /// (shared database, internal stage, ...) come from the classifier.
    pub const SCANNED: &'static [ObjectType] = &[
        Self::Database,
        Self::Warehouse,
        Self::Integration,
        Self::Schema,
        Self::Table,
        Self::View,
        Self::Stage,
        Self::FileFormat,
        Self::Sequence,
        Self::Stream,
        Self::Task,
        Self::Pipe,
        Self::Function,
        Self::Procedure,
    ];

    /// Catalog bucket key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Role => "role",
            Self::Warehouse => "warehouse",
            Self::Integration => "integration",
            Self::Database => "database",
            Self::SharedDatabase => "shared database",
            Self::ApplicationDatabase => "application database",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::ExternalTable => "external table",
            Self::View => "view",
            Self::MaterializedView => "materialized view",
            Self::Stage => "stage",
            Self::InternalStage => "internal stage",
            Self::ExternalStage => "external stage",
            Self::FileFormat => "file format",
            Self::Sequence => "sequence",
            Self::Stream => "stream",
            Self::Task => "task",
            Self::Pipe => "pipe",
            Self::Function => "function",
            Self::Procedure => "procedure",
        }
    }

    /// Inventory columns joined (in order) to form an object's full name.
    /// Empty for types that are never inventoried.
    pub fn name_columns(self) -> &'static [&'static str] {
        match self {
            Self::Database | Self::Warehouse | Self::Integration => &["name"],
            Self::Schema => &["database_name", "name"],
            Self::Function | Self::Procedure => &["catalog_name", "schema_name", "arguments"],
            Self::Table
            | Self::View
            | Self::Stage
            | Self::FileFormat
            | Self::Sequence
            | Self::Stream
            | Self::Task
            | Self::Pipe => &["database_name", "schema_name", "name"],
            _ => &[],
        }
    }

    /// Keyword used in `SHOW <keyword>` inventory commands.
    pub fn show_keyword(self) -> String {
        crate::naming::pluralize(self.as_str()).to_uppercase()
    }

    /// Whether inventory is account-wide without an `IN ACCOUNT` scope.
    pub fn is_integration(self) -> bool {
        matches!(self, Self::Integration)
    }

    /// Whether this is a procedure or function.
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Procedure)
    }

    /// The column that names the database owning an object of this type.
    pub fn owner_field(self) -> OwnerField {
        match self {
            Self::Function | Self::Procedure => OwnerField::CatalogName,
            Self::Database => OwnerField::Name,
            Self::Account
            | Self::Role
            | Self::Warehouse
            | Self::Integration
            | Self::SharedDatabase
            | Self::ApplicationDatabase => OwnerField::Exempt,
            _ => OwnerField::DatabaseName,
        }
    }

    /// The bucket whose objects can hold future grants for this type.
    pub fn future_container(self) -> Option<ObjectType> {
        match self {
            Self::Schema => Some(Self::Database),
            _ if matches!(
                self.owner_field(),
                OwnerField::DatabaseName | OwnerField::CatalogName
            ) =>
            {
                Some(Self::Schema)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized object type label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownObjectType(pub String);

impl fmt::Display for UnknownObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown object type '{}'", self.0)
    }
}

impl std::error::Error for UnknownObjectType {}

impl FromStr for ObjectType {
    type Err = UnknownObjectType;

    /// Case-insensitive; `_` and runs of whitespace count as one space, so
    /// `MATERIALIZED_VIEW` and `materialized view` are the same type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s
            .replace('_', " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| UnknownObjectType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_raw_grant_labels() {
        assert_eq!(
            "MATERIALIZED_VIEW".parse::<ObjectType>().unwrap(),
            ObjectType::MaterializedView
        );
        assert_eq!("file format".parse::<ObjectType>().unwrap(), ObjectType::FileFormat);
        assert!("DYNAMIC_TABLE".parse::<ObjectType>().is_err());
    }

    #[test]
    fn future_containers() {
        assert_eq!(ObjectType::Schema.future_container(), Some(ObjectType::Database));
        assert_eq!(ObjectType::Table.future_container(), Some(ObjectType::Schema));
        assert_eq!(ObjectType::Procedure.future_container(), Some(ObjectType::Schema));
        assert_eq!(ObjectType::Warehouse.future_container(), None);
        assert_eq!(ObjectType::Database.future_container(), None);
    }

    #[test]
    fn show_keywords() {
        assert_eq!(ObjectType::FileFormat.show_keyword(), "FILE FORMATS");
        assert_eq!(ObjectType::Schema.show_keyword(), "SCHEMAS");
        assert_eq!(ObjectType::Integration.show_keyword(), "INTEGRATIONS");
    }
}
