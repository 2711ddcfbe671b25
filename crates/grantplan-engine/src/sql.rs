//! Query text. Every interpolated identifier is double-quoted and every
//! literal single-quoted, so unusual names cannot produce malformed queries.

use grantplan_core::naming::{quote_ident, quote_literal};
use grantplan_core::types::ObjectType;

/// Column the name projection adds to every inventory row.
pub const FULL_NAME: &str = "FULL_NAME";

/// Column of raw callable signatures; used verbatim in the name projection.
const ARGUMENTS: &str = "arguments";

/// `SHOW <PLURAL> IN ACCOUNT`, or `SHOW INTEGRATIONS`.
pub fn inventory(object_type: ObjectType) -> String {
    if object_type.is_integration() {
        format!("SHOW {}", object_type.show_keyword())
    } else {
        format!("SHOW {} IN ACCOUNT", object_type.show_keyword())
    }
}

/// Projects the inventory result of `query_id` and adds a `FULL_NAME` column
/// joined from individually quoted name parts.
pub fn name_projection(query_id: &str, name_columns: &[&str]) -> String {
    let parts = name_columns
        .iter()
        .map(|column| {
            if *column == ARGUMENTS {
                quote_ident(column)
            } else {
                format!("'\"' || REPLACE({}, '\"', '\"\"') || '\"'", quote_ident(column))
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT *, CONCAT_WS('.', {parts}) AS {} FROM TABLE(RESULT_SCAN({}))",
        quote_ident(FULL_NAME),
        quote_literal(query_id)
    )
}

/// `SHOW GRANTS TO ROLE "<role>"`.
pub fn grants_to_role(role: &str) -> String {
    format!("SHOW GRANTS TO ROLE {}", principal_ident(role))
}

/// `SHOW FUTURE GRANTS TO ROLE "<role>"`.
pub fn future_grants_to_role(role: &str) -> String {
    format!("SHOW FUTURE GRANTS TO ROLE {}", principal_ident(role))
}

/// `(privilege, granted_on, name)` triples from a grant listing.
pub fn grant_projection(query_id: &str) -> String {
    format!(
        "SELECT \"privilege\", \"granted_on\", \"name\" FROM TABLE(RESULT_SCAN({}))",
        quote_literal(query_id)
    )
}

/// Future grant listings name the type column `grant_on`.
pub fn future_grant_projection(query_id: &str) -> String {
    format!(
        "SELECT \"privilege\", \"grant_on\" AS \"granted_on\", \"name\" \
         FROM TABLE(RESULT_SCAN({}))",
        quote_literal(query_id)
    )
}

/// `SHOW GRANTS TO USER "<user>"`.
pub fn grants_to_user(user: &str) -> String {
    format!("SHOW GRANTS TO USER {}", principal_ident(user))
}

/// Role names from a user grant listing.
pub fn user_role_projection(query_id: &str) -> String {
    format!("SELECT \"role\" FROM TABLE(RESULT_SCAN({}))", quote_literal(query_id))
}

/// Canonical principal names that are already quoted are used as they are.
fn principal_ident(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        name.to_string()
    } else {
        quote_ident(name)
    }
}
