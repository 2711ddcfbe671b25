//! Profile expansion against a hand-built catalog.

mod support;

use std::collections::BTreeMap;

use grantplan_core::access::AccessConfig;
use grantplan_core::errors::{ErrorCode, ExpansionError, PlanError};
use grantplan_core::types::{Grant, GrantSet, ObjectCatalog, ObjectType, SecurableObject};
use grantplan_engine::ProfileExpander;
use support::test_tables;

fn catalog() -> ObjectCatalog {
    let objects = |object_type: ObjectType, names: &[&str]| {
        (
            object_type,
            names
                .iter()
                .map(|n| SecurableObject::new(object_type, *n))
                .collect::<Vec<_>>(),
        )
    };
    [
        objects(ObjectType::Database, &["DB1", "DB2"]),
        objects(ObjectType::Schema, &["DB1.SCHEMA1", "DB1.SCHEMA2", "DB2.SCHEMA1"]),
        objects(
            ObjectType::Table,
            &["DB1.SCHEMA1.FOO", "DB1.SCHEMA1.FOOBAR", "DB1.SCHEMA2.T1", "DB2.SCHEMA1.T1"],
        ),
        objects(ObjectType::View, &["DB1.SCHEMA1.V_SALES", "DB1.SCHEMA1.V_COSTS"]),
    ]
    .into_iter()
    .collect()
}

fn access(yaml: &str) -> AccessConfig {
    AccessConfig::from_yaml_str(yaml).unwrap()
}

fn expand(yaml: &str, profile: &str, params: &[(&str, &str)]) -> Result<GrantSet, ExpansionError> {
    expand_in(&catalog(), yaml, profile, params)
}

fn expand_in(
    catalog: &ObjectCatalog,
    yaml: &str,
    profile: &str,
    params: &[(&str, &str)],
) -> Result<GrantSet, ExpansionError> {
    let access = access(yaml);
    let tables = test_tables();
    let params: BTreeMap<String, String> =
        params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    ProfileExpander::new(catalog, &tables).expand(profile, &access.profiles[profile], &params)
}

fn set(grants: &[(&str, &str, &str)]) -> GrantSet {
    grants.iter().map(|(p, t, n)| Grant::new(p, t, n)).collect()
}

#[test]
fn patterns_are_anchored() {
    let grants = expand(
        "profiles: { p: { privileges: { table: { read: [DB1.SCHEMA1.FOO] } } } }",
        "p",
        &[],
    )
    .unwrap();
    assert_eq!(grants, set(&[("SELECT", "TABLE", "DB1.SCHEMA1.FOO")]));
}

#[test]
fn patterns_match_case_insensitively_after_substitution() {
    let grants = expand(
        "profiles: { p: { privileges: { view: { read: ['{db}.schema1.v_sales'] } } } }",
        "p",
        &[("db", "db1")],
    )
    .unwrap();
    assert_eq!(grants, set(&[("SELECT", "VIEW", "DB1.SCHEMA1.V_SALES")]));
}

#[test]
fn wildcard_on_schema_objects_adds_future_grant_in_schema() {
    let grants = expand(
        "profiles: { p: { privileges: { table: { read: ['{db}.SCHEMA1.*'] } } } }",
        "p",
        &[("db", "DB1")],
    )
    .unwrap();
    assert_eq!(
        grants,
        set(&[
            ("SELECT", "TABLE", "DB1.SCHEMA1.FOO"),
            ("SELECT", "TABLE", "DB1.SCHEMA1.FOOBAR"),
            ("SELECT", "FUTURE TABLES IN SCHEMA", "DB1.SCHEMA1"),
        ])
    );
}

#[test]
fn wildcard_on_schemas_adds_future_grant_in_database() {
    let grants = expand(
        "profiles: { p: { privileges: { schema: { read: ['DB1.*'] } } } }",
        "p",
        &[],
    )
    .unwrap();
    assert_eq!(
        grants,
        set(&[
            ("USAGE", "SCHEMA", "DB1.SCHEMA1"),
            ("USAGE", "SCHEMA", "DB1.SCHEMA2"),
            ("USAGE", "FUTURE SCHEMAS IN DATABASE", "DB1"),
        ])
    );
}

#[test]
fn escaped_separators_still_find_the_container() {
    let grants = expand(
        r"profiles: { p: { privileges: { table: { read: ['DB2\.SCHEMA1\..*'] } } } }",
        "p",
        &[],
    )
    .unwrap();
    assert!(grants.contains(&Grant::new("SELECT", "TABLE", "DB2.SCHEMA1.T1")));
    assert!(grants.contains(&Grant::new("SELECT", "FUTURE TABLES IN SCHEMA", "DB2.SCHEMA1")));
    assert_eq!(grants.len(), 2);
}

#[test]
fn unsupported_pairs_never_appear() {
    let grants = expand(
        "profiles: { p: { privileges: { table: { maintain: [DB1.SCHEMA2.*] } } } }",
        "p",
        &[],
    )
    .unwrap();
    assert_eq!(
        grants,
        set(&[
            ("SELECT", "TABLE", "DB1.SCHEMA2.T1"),
            ("SELECT", "FUTURE TABLES IN SCHEMA", "DB1.SCHEMA2"),
        ])
    );

    // Ownership of existing schemas is unsupported, ownership of future ones is not.
    let grants = expand(
        "profiles: { p: { privileges: { schema: { own: [DB2.*] } } } }",
        "p",
        &[],
    )
    .unwrap();
    assert_eq!(grants, set(&[("OWNERSHIP", "FUTURE SCHEMAS IN DATABASE", "DB2")]));
}

#[test]
fn account_entries_name_the_account_directly() {
    let grants = expand(
        "profiles: { p: { privileges: { account: { monitor: ['{account}'] } } } }",
        "p",
        &[("account", "acme_eu")],
    )
    .unwrap();
    assert_eq!(grants, set(&[("MONITOR USAGE", "ACCOUNT", "ACME_EU")]));
}

#[test]
fn role_key_is_skipped() {
    let yaml = r#"
profiles:
  p:
    privileges:
      role: { usage: [SOMEONE] }
      database: { read: [DB2] }
"#;
    let grants = expand(yaml, "p", &[]).unwrap();
    assert_eq!(grants, set(&[("USAGE", "DATABASE", "DB2")]));
}

#[test]
fn quoted_name_parts_keep_their_case_in_targets() {
    let catalog: ObjectCatalog = [(
        ObjectType::Table,
        vec![
            SecurableObject::new(ObjectType::Table, "DB1.\"my schema\".T1"),
            SecurableObject::new(ObjectType::Table, "DB1.SCHEMA1.FOO"),
        ],
    )]
    .into_iter()
    .collect();
    let grants = expand_in(
        &catalog,
        "profiles: { p: { privileges: { table: { read: ['db1.*'] } } } }",
        "p",
        &[],
    )
    .unwrap();

    assert!(grants.contains(&Grant::new("SELECT", "TABLE", "DB1.\"my schema\".T1")));
    assert!(grants.contains(&Grant::new("SELECT", "TABLE", "DB1.SCHEMA1.FOO")));
    assert!(!grants.iter().any(|g| g.target.contains("MY SCHEMA")));
    assert!(grants.iter().all(|g| g.privilege == "SELECT"));
}

#[test]
fn unbound_parameter_names_profile_and_parameter() {
    let err = expand(
        "profiles: { p: { privileges: { table: { read: ['{db}.SCHEMA1.*'] } } } }",
        "p",
        &[],
    )
    .unwrap_err();
    assert_eq!(err.error_code(), "UNBOUND_PARAMETER");
    match err {
        ExpansionError::UnboundParameter { profile, parameter, .. } => {
            assert_eq!(profile, "p");
            assert_eq!(parameter, "db");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn no_match_is_not_an_error() {
    let grants = expand(
        "profiles: { p: { privileges: { table: { read: [NOWHERE.*] } } } }",
        "p",
        &[],
    )
    .unwrap();
    assert!(grants.is_empty());
}

#[test]
fn role_target_is_union_of_bound_profiles() {
    let access = access(
        r#"
profiles:
  reader:
    privileges:
      table:
        read: ["{db}.SCHEMA1.FOO"]
  viewer:
    privileges:
      view:
        read: DB1.SCHEMA1.V_.*
roles:
  ANALYST:
    profiles:
      - reader: { db: DB1 }
      - reader: { db: DB2 }
      - viewer
"#,
    );
    let catalog = catalog();
    let tables = test_tables();
    let expander = ProfileExpander::new(&catalog, &tables);
    let grants = expander
        .expand_role("ANALYST", &access.roles["ANALYST"].profiles, &access.profiles)
        .unwrap();
    assert_eq!(
        grants,
        set(&[
            ("SELECT", "TABLE", "DB1.SCHEMA1.FOO"),
            ("SELECT", "VIEW", "DB1.SCHEMA1.V_COSTS"),
            ("SELECT", "VIEW", "DB1.SCHEMA1.V_SALES"),
        ])
    );
}

#[test]
fn expansion_failure_names_the_role() {
    let access = access(
        r#"
profiles:
  reader:
    privileges:
      table:
        read: ["{db}.SCHEMA1.*"]
roles:
  BROKEN:
    profiles: [reader]
"#,
    );
    let catalog = catalog();
    let tables = test_tables();
    let err = ProfileExpander::new(&catalog, &tables)
        .expand_role("BROKEN", &access.roles["BROKEN"].profiles, &access.profiles)
        .unwrap_err();
    assert!(matches!(err, PlanError::Expansion { ref role, .. } if role == "BROKEN"));
    assert!(err.coded_string().starts_with("[UNBOUND_PARAMETER] role BROKEN"));
}

#[test]
fn expansion_is_deterministic() {
    let yaml = r#"
profiles:
  p:
    privileges:
      table: { select_insert: ['DB.*'] }
      view: { read: ['.*'] }
"#;
    let first = expand(yaml, "p", &[]).unwrap();
    for _ in 0..5 {
        assert_eq!(expand(yaml, "p", &[]).unwrap(), first);
    }
}
