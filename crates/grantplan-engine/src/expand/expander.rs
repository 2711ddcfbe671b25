//! Expansion of (profile, bindings) into a concrete grant set.
//!
//! A pure function of the catalog, the profile, the bindings and the
//! privilege tables.

use std::collections::BTreeMap;

use grantplan_core::access::{ProfileBinding, RoleProfile, ROLE_KEY};
use grantplan_core::errors::{ConfigError, ExpansionError, PlanError};
use grantplan_core::types::{FutureScope, Grant, GrantSet, ObjectCatalog, ObjectType};
use grantplan_core::PrivilegeTables;

use super::pattern::{substitute, NamePattern};

pub struct ProfileExpander<'a> {
    catalog: &'a ObjectCatalog,
    tables: &'a PrivilegeTables,
}

impl<'a> ProfileExpander<'a> {
    pub fn new(catalog: &'a ObjectCatalog, tables: &'a PrivilegeTables) -> Self {
        Self { catalog, tables }
    }

    /// Target grants for a role: the union of every bound profile.
    pub fn expand_role(
        &self,
        role: &str,
        bindings: &[ProfileBinding],
        profiles: &BTreeMap<String, RoleProfile>,
    ) -> Result<GrantSet, PlanError> {
        let mut grants = GrantSet::new();
        for binding in bindings {
            let profile = profiles.get(&binding.profile).ok_or_else(|| ConfigError::UnknownProfile {
                role: role.to_string(),
                profile: binding.profile.clone(),
            })?;
            let expanded = self
                .expand(&binding.profile, profile, &binding.params)
                .map_err(|source| PlanError::Expansion {
                    role: role.to_string(),
                    source,
                })?;
            grants.extend(expanded);
        }
        Ok(grants)
    }

    /// Grants for one profile under one set of bindings.
    ///
    /// Privileges and type labels are upper-case. Targets are canonical
    /// names as the catalog holds them: unquoted parts upper-case, quoted
    /// parts that are not plain identifiers keep their quotes and case
    /// (`DB1."my schema".T1`).
    pub fn expand(
        &self,
        profile_name: &str,
        profile: &RoleProfile,
        params: &BTreeMap<String, String>,
    ) -> Result<GrantSet, ExpansionError> {
        let mut grants = GrantSet::new();
        for (type_key, groups) in &profile.privileges {
            if type_key == ROLE_KEY {
                continue;
            }
            let unknown_type = || ExpansionError::UnknownObjectType {
                profile: profile_name.to_string(),
                object_type: type_key.clone(),
            };
            let object_type = type_key.parse::<ObjectType>().map_err(|_| unknown_type())?;
            let label = self.tables.label(object_type).ok_or_else(unknown_type)?;

            for (group, patterns) in groups {
                let verbs = self
                    .tables
                    .verbs(object_type, group)
                    .ok_or_else(|| ExpansionError::UnknownPrivilegeGroup {
                        profile: profile_name.to_string(),
                        object_type: type_key.clone(),
                        group: group.clone(),
                    })?;

                if object_type == ObjectType::Account {
                    for raw in &patterns.0 {
                        let account = substitute(profile_name, raw, params)?.to_uppercase();
                        for verb in verbs {
                            self.push(&mut grants, Grant::new(verb, label, &account));
                        }
                    }
                    continue;
                }

                let compiled = patterns
                    .0
                    .iter()
                    .map(|raw| NamePattern::compile(profile_name, raw, params))
                    .collect::<Result<Vec<_>, _>>()?;

                for name in self.catalog.names(object_type) {
                    if compiled.iter().any(|p| p.matches(name)) {
                        for verb in verbs {
                            self.push(&mut grants, Grant::new(verb, label, name));
                        }
                    }
                }

                for (container, scope) in self.future_targets(object_type, &compiled) {
                    for verb in verbs {
                        self.push(&mut grants, Grant::future(verb, label, scope, container));
                    }
                }
            }
        }

        tracing::debug!(profile = profile_name, grants = grants.len(), "expanded profile");
        Ok(grants)
    }

    /// Containers covered by the wildcard patterns, with the scope a future
    /// grant on them takes.
    fn future_targets<'p>(
        &'p self,
        object_type: ObjectType,
        patterns: &'p [NamePattern],
    ) -> impl Iterator<Item = (&'a str, FutureScope)> + 'p {
        let scope = match object_type {
            ObjectType::Schema => FutureScope::Database,
            _ => FutureScope::Schema,
        };
        let containers = match object_type.future_container() {
            Some(container) if patterns.iter().any(NamePattern::is_wildcard) => {
                self.catalog.bucket(container)
            }
            _ => &[],
        };
        containers
            .iter()
            .map(|o| o.name.as_str())
            .filter(move |name| patterns.iter().any(|p| p.matches_container(name)))
            .map(move |name| (name, scope))
    }

    fn push(&self, grants: &mut GrantSet, grant: Grant) {
        if !self.tables.is_unsupported(&grant.privilege, &grant.object_type) {
            grants.insert(grant);
        }
    }
}
