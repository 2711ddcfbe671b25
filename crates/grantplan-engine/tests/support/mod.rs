//! Shared fixtures: an in-memory remote system and row builders.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use grantplan_core::errors::TransportError;
use grantplan_core::traits::{QueryResult, Session, SessionFactory};
use grantplan_core::types::{ObjectType, RawRow};
use grantplan_core::PrivilegeTables;
use grantplan_engine::sql;

/// A small privilege vocabulary with groups sized for the scenarios.
pub const TEST_TABLES: &str = r#"
unsupported = [
    ["OWNERSHIP", "TABLE"],
    ["OWNERSHIP", "SCHEMA"],
    ["REBUILD", "TABLE"],
    ["REBUILD", "FUTURE TABLES IN SCHEMA"],
]

[aliases]
"account" = "ACCOUNT"
"role" = "ROLE"
"database" = "DATABASE"
"shared database" = "DATABASE"
"application database" = "DATABASE"
"schema" = "SCHEMA"
"table" = "TABLE"
"external table" = "EXTERNAL TABLE"
"view" = "VIEW"
"materialized view" = "MATERIALIZED VIEW"
"stage" = "STAGE"
"internal stage" = "STAGE"
"external stage" = "STAGE"
"function" = "FUNCTION"

[groups.account]
monitor = ["MONITOR USAGE"]

[groups.database]
read = ["USAGE"]

[groups.schema]
read = ["USAGE"]
own = ["OWNERSHIP"]

[groups.table]
read = ["SELECT"]
select_insert = ["SELECT", "INSERT"]
maintain = ["SELECT", "REBUILD"]

[groups.view]
read = ["SELECT"]

[groups."materialized view"]
read = ["SELECT"]

[groups."internal stage"]
read = ["READ"]

[groups.function]
read = ["USAGE"]
"#;

pub fn test_tables() -> PrivilegeTables {
    PrivilegeTables::from_toml(TEST_TABLES).unwrap()
}

/// How the fake answers one listing.
#[derive(Debug, Clone)]
pub enum Listing {
    Rows(Vec<RawRow>),
    Fail(String),
    Slow(Duration, Vec<RawRow>),
}

/// An in-memory remote system.
///
/// `SHOW` queries are answered from registered listings (unregistered ones
/// return no rows) and get their own text as query id. A projection over
/// `RESULT_SCAN('<id>')` returns the rows of that listing unchanged, so
/// registered rows carry the projected columns directly.
#[derive(Clone, Default)]
pub struct FakeRemote {
    listings: Arc<BTreeMap<String, Listing>>,
    log: Arc<Mutex<Vec<String>>>,
    connect_delay: Duration,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(mut self, sql: String, listing: Listing) -> Self {
        Arc::make_mut(&mut self.listings).insert(sql, listing);
        self
    }

    pub fn objects(self, object_type: ObjectType, rows: Vec<RawRow>) -> Self {
        self.register(sql::inventory(object_type), Listing::Rows(rows))
    }

    pub fn failing_objects(self, object_type: ObjectType, message: &str) -> Self {
        self.register(sql::inventory(object_type), Listing::Fail(message.to_string()))
    }

    pub fn slow_objects(self, object_type: ObjectType, delay: Duration) -> Self {
        self.register(sql::inventory(object_type), Listing::Slow(delay, Vec::new()))
    }

    /// Every `open()` sleeps this long before handing out a session.
    pub fn slow_connect(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn role_grants(self, role: &str, rows: Vec<RawRow>) -> Self {
        self.register(sql::grants_to_role(role), Listing::Rows(rows))
    }

    pub fn failing_role_grants(self, role: &str, message: &str) -> Self {
        self.register(sql::grants_to_role(role), Listing::Fail(message.to_string()))
    }

    pub fn future_grants(self, role: &str, rows: Vec<RawRow>) -> Self {
        self.register(sql::future_grants_to_role(role), Listing::Rows(rows))
    }

    pub fn user_roles(self, user: &str, roles: &[&str]) -> Self {
        let rows = roles.iter().map(|r| RawRow::new().with("role", *r)).collect();
        self.register(sql::grants_to_user(user), Listing::Rows(rows))
    }

    /// A shared handle, as the catalog builder and planner take it.
    pub fn factory(&self) -> Arc<dyn SessionFactory> {
        Arc::new(self.clone())
    }

    /// Every query issued so far, in issue order.
    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl SessionFactory for FakeRemote {
    fn open(&self) -> Result<Box<dyn Session>, TransportError> {
        if !self.connect_delay.is_zero() {
            std::thread::sleep(self.connect_delay);
        }
        Ok(Box::new(FakeSession { remote: self.clone() }))
    }
}

struct FakeSession {
    remote: FakeRemote,
}

impl Session for FakeSession {
    fn execute(&mut self, sql: &str, _timeout: Duration) -> Result<QueryResult, TransportError> {
        self.remote.log.lock().unwrap().push(sql.to_string());

        if let Some(query_id) = result_scan_id(sql) {
            return match self.remote.listings.get(&query_id) {
                Some(Listing::Rows(rows)) | Some(Listing::Slow(_, rows)) => {
                    Ok(QueryResult::new(sql, rows.clone()))
                }
                _ => Ok(QueryResult::new(sql, Vec::new())),
            };
        }

        match self.remote.listings.get(sql) {
            Some(Listing::Fail(message)) => Err(TransportError::QueryFailed {
                query: sql.to_string(),
                message: message.clone(),
            }),
            Some(Listing::Slow(delay, _)) => {
                std::thread::sleep(*delay);
                Ok(QueryResult::new(sql, Vec::new()))
            }
            _ => Ok(QueryResult::new(sql, Vec::new())),
        }
    }
}

/// The query id inside `RESULT_SCAN('...')`, unescaped.
fn result_scan_id(sql: &str) -> Option<String> {
    let start = sql.find("RESULT_SCAN('")? + "RESULT_SCAN('".len();
    let end = sql.rfind("'))")?;
    Some(sql[start..end].replace("''", "'"))
}

fn quoted(part: &str) -> String {
    format!("\"{}\"", part.replace('"', "\"\""))
}

fn full_name(parts: &[&str]) -> String {
    parts.iter().map(|p| quoted(p)).collect::<Vec<_>>().join(".")
}

// Inventory rows, shaped like the name projection's output.

pub fn database(name: &str, kind: &str) -> RawRow {
    RawRow::new()
        .with("name", name)
        .with("kind", kind)
        .with(sql::FULL_NAME, full_name(&[name]))
}

pub fn schema(db: &str, name: &str) -> RawRow {
    RawRow::new()
        .with("database_name", db)
        .with("name", name)
        .with(sql::FULL_NAME, full_name(&[db, name]))
}

pub fn table(db: &str, schema: &str, name: &str) -> RawRow {
    RawRow::new()
        .with("database_name", db)
        .with("schema_name", schema)
        .with("name", name)
        .with("is_external", "N")
        .with(sql::FULL_NAME, full_name(&[db, schema, name]))
}

pub fn external_table(db: &str, schema: &str, name: &str) -> RawRow {
    table(db, schema, name).with("is_external", "Y")
}

pub fn view(db: &str, schema: &str, name: &str, materialized: bool) -> RawRow {
    RawRow::new()
        .with("database_name", db)
        .with("schema_name", schema)
        .with("name", name)
        .with("is_materialized", if materialized { "true" } else { "false" })
        .with(sql::FULL_NAME, full_name(&[db, schema, name]))
}

pub fn stage(db: &str, schema: &str, name: &str, stage_type: &str) -> RawRow {
    RawRow::new()
        .with("database_name", db)
        .with("schema_name", schema)
        .with("name", name)
        .with("type", stage_type)
        .with(sql::FULL_NAME, full_name(&[db, schema, name]))
}

/// `signature` as reported in the `arguments` column, e.g.
/// `MY_FUNC(VARCHAR) RETURN VARCHAR`.
pub fn function(db: &str, schema: &str, signature: &str, builtin: bool) -> RawRow {
    RawRow::new()
        .with("catalog_name", db)
        .with("schema_name", schema)
        .with("arguments", signature)
        .with("is_builtin", if builtin { "Y" } else { "N" })
        .with(sql::FULL_NAME, format!("{}.{signature}", full_name(&[db, schema])))
}

/// A row of a grant projection.
pub fn grant(privilege: &str, granted_on: &str, name: &str) -> RawRow {
    RawRow::new()
        .with("privilege", privilege)
        .with("granted_on", granted_on)
        .with("name", name)
}
