//! Object Classifier.
//!
//! A single synchronous pass over a built catalog. Ambiguous buckets are
//! split into their precise sub-categories, then every bucket with an owning
//! container loses the objects that live in shared, application, or
//! transient databases. Never re-queries, never fails on empty buckets.

use std::collections::BTreeSet;

use grantplan_core::errors::ConfigError;
use grantplan_core::types::{ObjectCatalog, ObjectType, OwnerField, SecurableObject};
use regex::Regex;

const IMPORTED_DATABASE: &str = "IMPORTED DATABASE";
const APPLICATION: &str = "APPLICATION";
const INFORMATION_SCHEMA: &str = "INFORMATION_SCHEMA";

/// Owning-container names that belong to short-lived environments.
#[derive(Debug, Clone)]
pub struct TransientPattern(Regex);

impl TransientPattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| ConfigError::ValidationFailed {
                field: "scan.transient_pattern".to_string(),
                message: e.to_string(),
            })
    }

    pub fn is_transient(&self, container: &str) -> bool {
        self.0.is_match(unquoted(container))
    }
}

/// Classify a raw catalog into its final bucket layout.
pub fn classify(mut catalog: ObjectCatalog, transient: &TransientPattern) -> ObjectCatalog {
    let databases = catalog.take_bucket(ObjectType::Database);
    let shared = retyped_where(&databases, ObjectType::SharedDatabase, |o| {
        kind_is(o, IMPORTED_DATABASE)
    });
    let application = retyped_where(&databases, ObjectType::ApplicationDatabase, |o| {
        kind_is(o, APPLICATION)
    });
    let ignored: BTreeSet<String> =
        shared.iter().chain(&application).map(|o| o.name.clone()).collect();
    catalog.set_bucket(ObjectType::Database, databases);
    catalog.set_bucket(ObjectType::SharedDatabase, shared);
    catalog.set_bucket(ObjectType::ApplicationDatabase, application);

    let stages = catalog.take_bucket(ObjectType::Stage);
    let (external, internal): (Vec<_>, Vec<_>) = stages.iter().partition(|o| is_external_stage(o));
    catalog.set_bucket(
        ObjectType::InternalStage,
        internal.into_iter().map(|o| o.retyped(ObjectType::InternalStage)).collect(),
    );
    catalog.set_bucket(
        ObjectType::ExternalStage,
        external.into_iter().map(|o| o.retyped(ObjectType::ExternalStage)).collect(),
    );
    catalog.set_bucket(ObjectType::Stage, stages);

    let views: Vec<SecurableObject> = catalog
        .take_bucket(ObjectType::View)
        .into_iter()
        .filter(|o| o.schema.as_deref() != Some(INFORMATION_SCHEMA))
        .collect();
    let (materialized, plain): (Vec<_>, Vec<_>) =
        views.into_iter().partition(|o| o.flags.materialized);
    catalog.set_bucket(
        ObjectType::MaterializedView,
        materialized.into_iter().map(|o| o.retyped(ObjectType::MaterializedView)).collect(),
    );
    catalog.set_bucket(ObjectType::View, plain);

    let (external, plain): (Vec<_>, Vec<_>) = catalog
        .take_bucket(ObjectType::Table)
        .into_iter()
        .partition(|o| o.flags.external);
    catalog.set_bucket(
        ObjectType::ExternalTable,
        external.into_iter().map(|o| o.retyped(ObjectType::ExternalTable)).collect(),
    );
    catalog.set_bucket(ObjectType::Table, plain);

    let object_types: Vec<ObjectType> = catalog.object_types().collect();
    let mut dropped = 0usize;
    for object_type in object_types {
        if object_type.owner_field() == OwnerField::Exempt {
            continue;
        }
        let objects = catalog.take_bucket(object_type);
        let before = objects.len();
        let kept: Vec<SecurableObject> = objects
            .into_iter()
            .filter(|o| match o.database.as_deref() {
                Some(owner) => !ignored.contains(owner) && !transient.is_transient(owner),
                None => true,
            })
            .collect();
        dropped += before - kept.len();
        catalog.set_bucket(object_type, kept);
    }

    tracing::debug!(
        objects = catalog.len(),
        dropped,
        ignored_databases = ignored.len(),
        "catalog classified"
    );
    catalog
}

fn kind_is(object: &SecurableObject, kind: &str) -> bool {
    object.flags.kind.as_deref() == Some(kind)
}

fn is_external_stage(object: &SecurableObject) -> bool {
    object
        .flags
        .stage_type
        .as_deref()
        .is_some_and(|t| t.trim().to_ascii_uppercase().starts_with("EXTERNAL"))
}

fn retyped_where(
    objects: &[SecurableObject],
    object_type: ObjectType,
    keep: impl Fn(&SecurableObject) -> bool,
) -> Vec<SecurableObject> {
    objects.iter().filter(|o| keep(o)).map(|o| o.retyped(object_type)).collect()
}

fn unquoted(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_suffixes() {
        let pattern =
            TransientPattern::new(grantplan_core::config::DEFAULT_TRANSIENT_PATTERN).unwrap();
        assert!(pattern.is_transient("TEMP_DEV_42"));
        assert!(pattern.is_transient("\"feature_QA_12345\""));
        assert!(!pattern.is_transient("TEMP_DEV_123456"));
        assert!(!pattern.is_transient("SALES_PROD"));
    }

    #[test]
    fn empty_catalog_classifies() {
        let pattern =
            TransientPattern::new(grantplan_core::config::DEFAULT_TRANSIENT_PATTERN).unwrap();
        let classified = classify(ObjectCatalog::new(), &pattern);
        assert!(classified.is_empty());
        assert!(classified.bucket(ObjectType::ExternalTable).is_empty());
    }
}
