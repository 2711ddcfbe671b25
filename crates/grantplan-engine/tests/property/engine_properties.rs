use std::collections::BTreeMap;

use grantplan_core::types::{Grant, GrantSet, ObjectCatalog, ObjectType, SecurableObject};
use grantplan_core::PrivilegeTables;
use grantplan_engine::expand::pattern::{upper_outside_escapes, NamePattern};
use grantplan_engine::{diff, ProfileExpander};
use proptest::prelude::*;

fn grant_strategy() -> impl Strategy<Value = Grant> {
    (
        prop::sample::select(vec!["SELECT", "INSERT", "USAGE"]),
        prop::sample::select(vec!["TABLE", "VIEW", "FUTURE TABLES IN SCHEMA"]),
        "[A-C]{1,2}\\.[A-C]{1,2}",
    )
        .prop_map(|(privilege, label, target)| Grant::new(privilege, label, &target))
}

fn grant_set() -> impl Strategy<Value = GrantSet> {
    prop::collection::btree_set(grant_strategy(), 0..12)
}

fn identifier() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,6}"
}

proptest! {
    #[test]
    fn diff_partitions_current_and_target(current in grant_set(), target in grant_set()) {
        let d = diff(&current, &target);

        prop_assert!(d.to_revoke.is_disjoint(&d.ok));
        prop_assert!(d.ok.is_disjoint(&d.to_grant));
        prop_assert!(d.to_revoke.is_disjoint(&d.to_grant));

        let recovered_current: GrantSet = d.to_revoke.union(&d.ok).cloned().collect();
        let recovered_target: GrantSet = d.ok.union(&d.to_grant).cloned().collect();
        prop_assert_eq!(recovered_current, current);
        prop_assert_eq!(recovered_target, target);
    }

    #[test]
    fn literal_patterns_match_only_themselves(name in identifier(), other in identifier()) {
        let pattern = NamePattern::compile("p", &name.to_lowercase(), &BTreeMap::new()).unwrap();
        prop_assert!(pattern.matches(&name));
        prop_assert_eq!(pattern.matches(&other), name == other);
        let suffixed = format!("{name}X");
        prop_assert!(!pattern.matches(&suffixed));
    }

    #[test]
    fn upper_casing_is_idempotent(s in "[a-z\\\\.*]{0,20}") {
        let once = upper_outside_escapes(&s);
        prop_assert_eq!(upper_outside_escapes(&once), once.clone());
        prop_assert_eq!(once.len(), s.len());
    }

    #[test]
    fn expansion_is_deterministic_and_catalog_bounded(
        tables in prop::collection::btree_set(identifier(), 0..10),
        pattern in prop::sample::select(vec!["DB1.S1.*", "DB1.S1.T.*", ".*", "DB1\\.S1\\.A"]),
    ) {
        let catalog: ObjectCatalog = [
            (ObjectType::Schema, vec![SecurableObject::new(ObjectType::Schema, "DB1.S1")]),
            (
                ObjectType::Table,
                tables
                    .iter()
                    .map(|t| SecurableObject::new(ObjectType::Table, format!("DB1.S1.{t}")))
                    .collect(),
            ),
        ]
        .into_iter()
        .collect();
        let privilege_tables = PrivilegeTables::builtin().unwrap();
        let access = grantplan_core::access::AccessConfig::from_yaml_str(&format!(
            "profiles: {{ p: {{ privileges: {{ table: {{ read: ['{pattern}'] }} }} }} }}"
        ))
        .unwrap();
        let expander = ProfileExpander::new(&catalog, &privilege_tables);
        let profile = &access.profiles["p"];

        let first = expander.expand("p", profile, &BTreeMap::new()).unwrap();
        let second = expander.expand("p", profile, &BTreeMap::new()).unwrap();
        prop_assert_eq!(&first, &second);

        for grant in first.iter().filter(|g| !g.is_future()) {
            prop_assert!(catalog.names(ObjectType::Table).any(|n| n == grant.target));
        }
    }
}
