//! Object Catalog Builder.
//!
//! One unit of work per scanned object type. Each unit opens its own
//! session, runs the inventory query, projects canonical full names from
//! that result, and turns the rows into `SecurableObject`s. A type that
//! fails is reported on its own; it never empties or truncates another
//! type's bucket.

use std::sync::Arc;
use std::time::{Duration, Instant};

use grantplan_core::errors::{ConfigError, ScanError, TransportError};
use grantplan_core::naming::{canonical_name, stored_identifier};
use grantplan_core::traits::SessionFactory;
use grantplan_core::types::{
    ObjectCatalog, ObjectFlags, ObjectType, OwnerField, RawRow, SecurableObject,
};
use regex::Regex;

use crate::pool::WorkPool;
use crate::session::BoundedSession;
use crate::sql;

/// Run-level patterns over canonical names; a match drops the object.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Regex>,
}

impl IgnoreSet {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::ValidationFailed {
                    field: "scan.ignore_objects".to_string(),
                    message: format!("'{p}' is not a valid expression: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// Builds the raw (unclassified) catalog.
pub struct CatalogBuilder<'a> {
    factory: Arc<dyn SessionFactory>,
    pool: &'a WorkPool,
    timeout: Duration,
    ignore: &'a IgnoreSet,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(
        factory: Arc<dyn SessionFactory>,
        pool: &'a WorkPool,
        timeout: Duration,
        ignore: &'a IgnoreSet,
    ) -> Self {
        Self {
            factory,
            pool,
            timeout,
            ignore,
        }
    }

    /// Inventory every type in `types`. Successful types land in the
    /// catalog; failed types are returned alongside it.
    pub fn build(&self, types: &[ObjectType]) -> (ObjectCatalog, Vec<ScanError>) {
        let started = Instant::now();
        let outcome = self.pool.run("catalog", types.to_vec(), |object_type| {
            let object_type = *object_type;
            let mut session = BoundedSession::open(&self.factory, self.timeout)
                .map_err(|source| ScanError::ObjectFetch { object_type, source })?;
            fetch_objects(&mut session, object_type, self.ignore)
                .map_err(|source| ScanError::ObjectFetch { object_type, source })
        });

        let failures: Vec<ScanError> = outcome.failed.into_iter().map(|(_, e)| e).collect();
        for failure in &failures {
            tracing::warn!(error = %failure, "object type inventory failed");
        }
        let catalog: ObjectCatalog = outcome.succeeded.into_iter().collect();
        tracing::info!(
            types = types.len(),
            objects = catalog.len(),
            failed = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "catalog inventory finished"
        );
        (catalog, failures)
    }
}

/// Inventory one object type on `session`.
pub fn fetch_objects(
    session: &mut BoundedSession,
    object_type: ObjectType,
    ignore: &IgnoreSet,
) -> Result<Vec<SecurableObject>, TransportError> {
    let inventory = session.query(&sql::inventory(object_type))?;
    let projection_sql = sql::name_projection(&inventory.query_id, object_type.name_columns());
    let projected = session.query(&projection_sql)?;

    let mut objects = Vec::with_capacity(projected.rows.len());
    let mut builtin = 0usize;
    let mut ignored = 0usize;
    for row in projected.rows {
        if object_type.is_callable() && row.flag("is_builtin") {
            builtin += 1;
            continue;
        }
        let full_name = row.text(sql::FULL_NAME).ok_or_else(|| TransportError::MissingColumn {
            query: projection_sql.clone(),
            column: sql::FULL_NAME.to_string(),
        })?;
        let name = canonical_name(full_name, object_type);
        if ignore.is_ignored(&name) {
            ignored += 1;
            continue;
        }
        objects.push(object_from_row(object_type, name, row));
    }

    tracing::debug!(
        object_type = %object_type,
        objects = objects.len(),
        builtin,
        ignored,
        "inventoried object type"
    );
    Ok(objects)
}

/// Lift container identifiers and classification flags out of a row.
fn object_from_row(object_type: ObjectType, name: String, row: RawRow) -> SecurableObject {
    let owner_column = match object_type.owner_field() {
        OwnerField::CatalogName => Some("catalog_name"),
        OwnerField::Name => Some("name"),
        OwnerField::DatabaseName => Some("database_name"),
        OwnerField::Exempt => None,
    };
    let flags = ObjectFlags {
        kind: row.text("kind").map(str::to_string),
        builtin: row.flag("is_builtin"),
        external: row.flag("is_external"),
        materialized: row.flag("is_materialized"),
        stage_type: match object_type {
            ObjectType::Stage => row.text("type").map(str::to_string),
            _ => None,
        },
    };

    let mut object = SecurableObject::new(object_type, name).with_flags(flags);
    if let Some(database) = owner_column.and_then(|column| row.text(column)) {
        object = object.in_database(stored_identifier(database));
    }
    if let Some(schema) = row.text("schema_name") {
        object = object.in_schema(stored_identifier(schema));
    }
    let mut attributes = row.columns;
    attributes.remove(sql::FULL_NAME);
    object.attributes = attributes;
    object
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_comes_from_the_type_specific_column() {
        let row = RawRow::new()
            .with("catalog_name", "DB1")
            .with("schema_name", "my schema")
            .with("is_builtin", "N");
        let name = "DB1.\"my schema\".F()".to_string();
        let object = object_from_row(ObjectType::Function, name, row);
        assert_eq!(object.database.as_deref(), Some("DB1"));
        assert_eq!(object.schema.as_deref(), Some("\"my schema\""));

        let row = RawRow::new().with("name", "WH1");
        let object = object_from_row(ObjectType::Warehouse, "WH1".to_string(), row);
        assert_eq!(object.database, None);
    }

    #[test]
    fn ignore_set_matches_canonical_names() {
        let ignore = IgnoreSet::new(&["^SNOWFLAKE(_SAMPLE_DATA)?$".to_string()]).unwrap();
        assert!(ignore.is_ignored("SNOWFLAKE"));
        assert!(!ignore.is_ignored("SNOWFLAKE_LOGS"));
        assert!(IgnoreSet::new(&["(".to_string()]).is_err());
    }
}
