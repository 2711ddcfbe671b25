//! The object catalog: securable objects bucketed by type.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::object::SecurableObject;
use super::object_type::ObjectType;

/// Mapping from object type to an ordered sequence of objects.
///
/// Built once per run (or loaded from the cache) and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectCatalog {
    buckets: BTreeMap<ObjectType, Vec<SecurableObject>>,
}

impl ObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects of one type; empty when the bucket is absent.
    pub fn bucket(&self, object_type: ObjectType) -> &[SecurableObject] {
        self.buckets.get(&object_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace a bucket wholesale.
    pub fn set_bucket(&mut self, object_type: ObjectType, objects: Vec<SecurableObject>) {
        self.buckets.insert(object_type, objects);
    }

    /// Remove and return a bucket.
    pub fn take_bucket(&mut self, object_type: ObjectType) -> Vec<SecurableObject> {
        self.buckets.remove(&object_type).unwrap_or_default()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (ObjectType, &[SecurableObject])> {
        self.buckets.iter().map(|(t, objs)| (*t, objs.as_slice()))
    }

    pub fn object_types(&self) -> impl Iterator<Item = ObjectType> + '_ {
        self.buckets.keys().copied()
    }

    /// Names in a bucket, in catalog order.
    pub fn names(&self, object_type: ObjectType) -> impl Iterator<Item = &str> {
        self.bucket(object_type).iter().map(|o| o.name.as_str())
    }

    /// Names of databases shared into this account.
    pub fn shared_databases(&self) -> BTreeSet<String> {
        self.names(ObjectType::SharedDatabase).map(str::to_string).collect()
    }

    /// Total number of objects across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(ObjectType, Vec<SecurableObject>)> for ObjectCatalog {
    fn from_iter<I: IntoIterator<Item = (ObjectType, Vec<SecurableObject>)>>(iter: I) -> Self {
        Self {
            buckets: iter.into_iter().collect(),
        }
    }
}
