//! `plan` and `print-plan` end to end, against a recorded account.

use std::path::Path;

use clap::Parser;
use grantplan_cli::{run, Cli, Report};
use grantplan_core::errors::{ErrorCode, PlanError};
use grantplan_core::types::ObjectType;
use grantplan_engine::sql;
use grantplan_storage::{AccountPaths, GrantCache};
use serde_json::{json, Map, Value};
use tempfile::{tempdir, TempDir};

const ACCESS: &str = r#"
profiles:
  writer:
    privileges:
      table:
        write: ["{db}.SCH1.T1"]
  reader:
    privileges:
      schema:
        read: [DB1.SCH1]
roles:
  R1:
    profiles:
      - writer: { db: DB1 }
  R2:
    profiles: [reader]
users:
  ALICE:
    roles: [R1]
"#;

fn inventory_rows(object_type: ObjectType) -> Value {
    match object_type {
        ObjectType::Database => json!([{
            "name": "DB1",
            "kind": "STANDARD",
            "FULL_NAME": "\"DB1\""
        }]),
        ObjectType::Schema => json!([{
            "database_name": "DB1",
            "name": "SCH1",
            "FULL_NAME": "\"DB1\".\"SCH1\""
        }]),
        ObjectType::Table => json!([{
            "database_name": "DB1",
            "schema_name": "SCH1",
            "name": "T1",
            "is_external": "N",
            "rows": 10,
            "FULL_NAME": "\"DB1\".\"SCH1\".\"T1\""
        }]),
        _ => json!([]),
    }
}

/// Every query a full rescan issues, with a missing inventory for `skip`.
fn recording(skip: Option<ObjectType>) -> Value {
    let mut queries = Map::new();
    for &object_type in ObjectType::SCANNED {
        if Some(object_type) == skip {
            continue;
        }
        let query_id = format!("inv-{}", object_type.as_str().replace(' ', "-"));
        queries.insert(sql::inventory(object_type), json!({ "query_id": query_id, "rows": [] }));
        queries.insert(
            sql::name_projection(&query_id, object_type.name_columns()),
            json!({ "rows": inventory_rows(object_type) }),
        );
    }

    let current = json!([{ "privilege": "SELECT", "granted_on": "TABLE", "name": "DB1.SCH1.T1" }]);
    for role in ["R1", "R2"] {
        let id = format!("grants-{role}");
        let future_id = format!("future-{role}");
        let rows = if role == "R1" { current.clone() } else { json!([]) };
        queries.insert(sql::grants_to_role(role), json!({ "query_id": id }));
        queries.insert(sql::grant_projection(&id), json!({ "rows": rows }));
        queries.insert(sql::future_grants_to_role(role), json!({ "query_id": future_id }));
        queries.insert(sql::future_grant_projection(&future_id), json!({ "rows": [] }));
    }
    queries.insert(sql::grants_to_user("ALICE"), json!({ "query_id": "user-ALICE" }));
    queries.insert(
        sql::user_role_projection("user-ALICE"),
        json!({ "rows": [{ "role": "PUBLIC" }] }),
    );
    json!({ "queries": queries })
}

struct Account {
    dir: TempDir,
}

impl Account {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let paths = AccountPaths::new(&dir.path().join("state"), "ACME");
        paths.ensure_dir().unwrap();
        std::fs::write(paths.access_file(), ACCESS).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn paths(&self) -> AccountPaths {
        AccountPaths::new(&self.root().join("state"), "ACME")
    }

    fn record(&self, skip: Option<ObjectType>) -> String {
        let path = self.root().join("recording.json");
        std::fs::write(&path, recording(skip).to_string()).unwrap();
        path.display().to_string()
    }

    fn run(&self, args: &[&str]) -> Result<Report, PlanError> {
        let state_dir = self.root().join("state").display().to_string();
        let mut argv = vec!["grantplan"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["--state-dir", &state_dir]);
        run(Cli::try_parse_from(argv).unwrap(), self.root())
    }
}

/// Rendered plan without its header line, which carries the run time.
fn body(report: &Report) -> String {
    report.output.lines().skip(1).collect::<Vec<_>>().join("\n")
}

#[test]
fn rescan_writes_cache_and_plan() {
    let account = Account::new();
    let recording = account.record(None);
    let report = account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording])
        .unwrap();

    assert_eq!(report.failed_units, 0);
    assert!(report.output.contains("ROLE R1: 0 to revoke, 5 to grant, 1 in place"));
    assert!(report.output.contains("  + INSERT ON TABLE DB1.SCH1.T1"));
    assert!(report.output.contains("ROLE R2: 0 to revoke, 1 to grant, 0 in place"));
    assert!(!report.output.contains("USER"));

    let paths = account.paths();
    assert!(paths.cache_file().is_file());
    assert!(paths.plan_file().is_file());
    let cached = GrantCache::new(&paths).load().unwrap();
    assert_eq!(cached.snapshot.catalog.bucket(ObjectType::Table).len(), 1);
    assert_eq!(cached.snapshot.current.roles["R1"].len(), 1);
}

#[test]
fn cached_plan_matches_rescan_and_print_plan_shows_it() {
    let account = Account::new();
    let recording = account.record(None);
    let live = account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording, "--sequential"])
        .unwrap();
    let cached = account.run(&["plan", "--account", "ACME"]).unwrap();
    assert_eq!(body(&cached), body(&live));

    let printed = account.run(&["print-plan", "--account", "ACME"]).unwrap();
    assert_eq!(printed.output, cached.output);
}

#[test]
fn users_come_from_the_cache_once_captured() {
    let account = Account::new();

    // Users were not captured by a rescan without --users.
    let recording = account.record(None);
    account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording])
        .unwrap();
    let report = account.run(&["plan", "--account", "ACME", "--users"]).unwrap();
    assert_eq!(report.failed_units, 1);
    assert!(report.warnings.contains("user ALICE failed: [MISSING_STATE]"));

    account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording, "--users"])
        .unwrap();
    let report = account.run(&["plan", "--account", "ACME", "--users"]).unwrap();
    assert_eq!(report.failed_units, 0);
    assert!(report.output.contains("USER ALICE: 1 to revoke, 1 to grant, 0 in place"));
    assert!(report.output.contains("  - USAGE ON ROLE PUBLIC"));
    assert!(report.output.contains("  + USAGE ON ROLE R1"));
}

#[test]
fn partial_rescan_keeps_other_cached_roles() {
    let account = Account::new();
    let recording = account.record(None);
    account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording])
        .unwrap();
    account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording, "--role", "R2"])
        .unwrap();

    let cached = GrantCache::new(&account.paths()).load().unwrap();
    assert!(cached.snapshot.current.roles.contains_key("R1"));
    assert!(cached.snapshot.current.roles.contains_key("R2"));
}

#[test]
fn planning_without_a_cache_fails() {
    let account = Account::new();
    let err = account.run(&["plan", "--account", "ACME"]).unwrap_err();
    assert_eq!(err.error_code(), "STORAGE_ERROR");
    assert!(err.to_string().contains("--rescan"));
}

#[test]
fn missing_inventory_aborts_without_writing() {
    let account = Account::new();
    let recording = account.record(Some(ObjectType::Stage));
    let err = account
        .run(&["plan", "--account", "ACME", "--rescan", "--replay", &recording])
        .unwrap_err();
    assert_eq!(err.error_code(), "INCOMPLETE_CATALOG");
    assert!(!account.paths().cache_file().exists());
    assert!(!account.paths().plan_file().exists());
}

#[test]
fn print_plan_without_history_fails() {
    let account = Account::new();
    let err = account.run(&["print-plan", "--account", "ACME"]).unwrap_err();
    assert!(err.to_string().contains("no plan for account ACME"));
}
