//! Fetch and filter the grants a role or user holds right now.

use std::collections::BTreeSet;

use grantplan_core::errors::{ScanError, TransportError};
use grantplan_core::naming::{canonical_name, first_part, split_qualified, stored_identifier};
use grantplan_core::types::{
    future_label, FutureScope, Grant, GrantSet, ObjectCatalog, ObjectType, RawRow,
};
use grantplan_core::PrivilegeTables;

use crate::session::BoundedSession;
use crate::sql;

/// Which listing a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing {
    Current,
    Future,
}

pub struct GrantNormalizer<'a> {
    tables: &'a PrivilegeTables,
    shared_databases: BTreeSet<String>,
}

impl<'a> GrantNormalizer<'a> {
    pub fn new(tables: &'a PrivilegeTables, catalog: &ObjectCatalog) -> Self {
        Self {
            tables,
            shared_databases: catalog.shared_databases(),
        }
    }

    /// Current and future grants held by `role`, merged and filtered.
    pub fn fetch_role(
        &self,
        session: &mut BoundedSession,
        role: &str,
    ) -> Result<GrantSet, ScanError> {
        let wrap = |source: TransportError| ScanError::RoleGrantFetch {
            role: role.to_string(),
            source,
        };

        let listing = session.query(&sql::grants_to_role(role)).map_err(wrap)?;
        let query = sql::grant_projection(&listing.query_id);
        let current = session.query(&query).map_err(wrap)?;
        let mut grants = self.normalize_current(&query, &current.rows).map_err(wrap)?;

        let listing = session.query(&sql::future_grants_to_role(role)).map_err(wrap)?;
        let query = sql::future_grant_projection(&listing.query_id);
        let future = session.query(&query).map_err(wrap)?;
        grants.extend(self.normalize_future(&query, &future.rows).map_err(wrap)?);

        tracing::debug!(role, grants = grants.len(), "normalized current grants");
        Ok(grants)
    }

    /// Roles granted to `user`, as `(USAGE, ROLE, <role>)` triples.
    pub fn fetch_user(
        &self,
        session: &mut BoundedSession,
        user: &str,
    ) -> Result<GrantSet, ScanError> {
        let wrap = |source: TransportError| ScanError::UserGrantFetch {
            user: user.to_string(),
            source,
        };
        let listing = session.query(&sql::grants_to_user(user)).map_err(wrap)?;
        let query = sql::user_role_projection(&listing.query_id);
        let result = session.query(&query).map_err(wrap)?;
        let roles = role_memberships(&query, &result.rows).map_err(wrap)?;
        tracing::debug!(user, roles = roles.len(), "normalized user roles");
        Ok(roles)
    }

    /// Rows of `(privilege, granted_on, name)` from a current-grant listing.
    pub fn normalize_current(
        &self,
        query: &str,
        rows: &[RawRow],
    ) -> Result<GrantSet, TransportError> {
        self.normalize(query, rows, Listing::Current)
    }

    /// Rows of `(privilege, granted_on, name)` from a future-grant listing,
    /// where `name` is a container with a `<TYPE>` placeholder.
    pub fn normalize_future(
        &self,
        query: &str,
        rows: &[RawRow],
    ) -> Result<GrantSet, TransportError> {
        self.normalize(query, rows, Listing::Future)
    }

    fn normalize(
        &self,
        query: &str,
        rows: &[RawRow],
        listing: Listing,
    ) -> Result<GrantSet, TransportError> {
        let mut grants = GrantSet::new();
        for row in rows {
            let privilege = column(query, row, "privilege")?;
            let granted_on = column(query, row, "granted_on")?;
            let name = column(query, row, "name")?;

            let Some((object_type, label)) = self.tables.resolve(granted_on) else {
                tracing::debug!(granted_on, name, "skipping grant on an unknown object type");
                continue;
            };
            if object_type == ObjectType::Role {
                continue;
            }

            let target = canonical_name(name, object_type);
            if self.shared_databases.contains(&first_part(&target)) {
                continue;
            }

            let grant = match listing {
                Listing::Current => Grant::new(privilege, label, &target),
                Listing::Future => {
                    let database_wide = object_type == ObjectType::Schema
                        || split_qualified(&target).len() == 1;
                    let scope = if database_wide {
                        FutureScope::Database
                    } else {
                        FutureScope::Schema
                    };
                    Grant {
                        privilege: privilege.to_uppercase(),
                        object_type: future_label(label, scope),
                        target,
                    }
                }
            };
            if self.tables.is_unsupported(&grant.privilege, &grant.object_type) {
                continue;
            }
            grants.insert(grant);
        }
        Ok(grants)
    }
}

/// Rows with a `role` column become role-membership grants. The column
/// holds the role's stored name, so case is kept and only non-plain names
/// are quoted.
pub fn role_memberships(query: &str, rows: &[RawRow]) -> Result<GrantSet, TransportError> {
    rows.iter()
        .map(|row| {
            column(query, row, "role").map(|role| Grant::role_membership(&stored_identifier(role)))
        })
        .collect()
}

fn column<'r>(query: &str, row: &'r RawRow, name: &str) -> Result<&'r str, TransportError> {
    row.text(name).ok_or_else(|| TransportError::MissingColumn {
        query: query.to_string(),
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use grantplan_core::naming::canonical_principal;
    use grantplan_core::types::SecurableObject;

    use super::*;

    fn grant_row(privilege: &str, granted_on: &str, name: &str) -> RawRow {
        RawRow::new()
            .with("privilege", privilege)
            .with("granted_on", granted_on)
            .with("name", name)
    }

    fn catalog_with_share() -> ObjectCatalog {
        let mut catalog = ObjectCatalog::new();
        catalog.set_bucket(
            ObjectType::SharedDatabase,
            vec![SecurableObject::new(ObjectType::SharedDatabase, "PARTNER_SHARE")],
        );
        catalog
    }

    #[test]
    fn current_grants_are_filtered() {
        let tables = PrivilegeTables::builtin().unwrap();
        let catalog = catalog_with_share();
        let normalizer = GrantNormalizer::new(&tables, &catalog);
        let rows = vec![
            grant_row("SELECT", "TABLE", "\"DB1\".\"SCH1\".\"T1\""),
            grant_row("OWNERSHIP", "TABLE", "DB1.SCH1.T1"),
            grant_row("USAGE", "DATABASE", "PARTNER_SHARE"),
            grant_row("USAGE", "ROLE", "OTHER_ROLE"),
            grant_row("USAGE", "DYNAMIC_TABLE", "DB1.SCH1.DT1"),
            grant_row("SELECT", "MATERIALIZED_VIEW", "DB1.SCH1.MV1"),
        ];
        let grants = normalizer.normalize_current("q", &rows).unwrap();
        let expected: GrantSet = [
            Grant::new("SELECT", "TABLE", "DB1.SCH1.T1"),
            Grant::new("SELECT", "MATERIALIZED VIEW", "DB1.SCH1.MV1"),
        ]
        .into_iter()
        .collect();
        assert_eq!(grants, expected);
    }

    #[test]
    fn future_grants_get_scoped_labels() {
        let tables = PrivilegeTables::builtin().unwrap();
        let catalog = ObjectCatalog::new();
        let normalizer = GrantNormalizer::new(&tables, &catalog);
        let rows = vec![
            grant_row("SELECT", "TABLE", "DB1.SCH1.<TABLE>"),
            grant_row("USAGE", "SCHEMA", "DB1.<SCHEMA>"),
            grant_row("SELECT", "VIEW", "DB2.<VIEW>"),
            grant_row("REBUILD", "TABLE", "DB1.SCH1.<TABLE>"),
        ];
        let grants = normalizer.normalize_future("q", &rows).unwrap();
        let labels: Vec<(String, String)> =
            grants.into_iter().map(|g| (g.object_type, g.target)).collect();
        assert_eq!(
            labels,
            vec![
                ("FUTURE TABLES IN SCHEMA".to_string(), "DB1.SCH1".to_string()),
                ("FUTURE VIEWS IN DATABASE".to_string(), "DB2".to_string()),
                ("FUTURE SCHEMAS IN DATABASE".to_string(), "DB1".to_string()),
            ]
        );
    }

    #[test]
    fn missing_columns_are_errors() {
        let tables = PrivilegeTables::builtin().unwrap();
        let catalog = ObjectCatalog::new();
        let normalizer = GrantNormalizer::new(&tables, &catalog);
        let rows = vec![RawRow::new().with("privilege", "SELECT")];
        assert!(matches!(
            normalizer.normalize_current("q", &rows).unwrap_err(),
            TransportError::MissingColumn { ref column, .. } if column == "granted_on"
        ));
    }

    #[test]
    fn user_roles_become_memberships() {
        let rows = vec![
            RawRow::new().with("role", "ANALYST"),
            RawRow::new().with("role", "LOADER"),
        ];
        let roles = role_memberships("q", &rows).unwrap();
        assert!(roles.contains(&Grant::new("USAGE", "ROLE", "ANALYST")));
        assert!(roles.contains(&Grant::new("USAGE", "ROLE", "LOADER")));
    }

    #[test]
    fn mixed_case_role_names_keep_their_case() {
        let rows = vec![
            RawRow::new().with("role", "Mixed"),
            RawRow::new().with("role", "analyst"),
        ];
        let roles = role_memberships("q", &rows).unwrap();
        let expected: GrantSet = [
            Grant::role_membership(&canonical_principal("\"Mixed\"")),
            Grant::role_membership(&canonical_principal("\"analyst\"")),
        ]
        .into_iter()
        .collect();
        assert_eq!(roles, expected);
        assert!(roles.iter().any(|g| g.target == "\"Mixed\""));
        assert!(!roles.contains(&Grant::role_membership("MIXED")));
    }
}
