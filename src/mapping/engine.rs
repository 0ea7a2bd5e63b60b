//! # Mapping Convergence
//!
//! Ensures a desired role or user mapping exists in the store.
//!
//! # Invariants
//!
//! - Invalid input is rejected before the store is contacted.
//! - The store is listed fresh on every call; nothing is cached.
//! - A record is created only when no equivalent record exists.
//! - Existing records are never modified or removed, duplicates included.

use std::sync::Arc;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::errors::{MappingError, MappingResult};
use super::matching::record_matches;
use super::store::MappingStore;
use super::types::{DesiredMapping, IdentityMappingRecord, RoleMapping, UserMapping};

/// Result of a successful convergence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Convergence {
    /// An equivalent record was already present; nothing was written
    Unchanged { existing: String },
    /// A new record was created under this name
    Created { name: String },
}

impl Convergence {
    pub fn created(&self) -> bool {
        matches!(self, Convergence::Created { .. })
    }
}

/// Converges desired identity mappings into a [`MappingStore`].
pub struct MappingConvergenceEngine<S: MappingStore> {
    store: S,
    metrics: Arc<MetricsRegistry>,
}

impl<S: MappingStore> MappingConvergenceEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Share a metrics registry with other components.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Ensure `desired` role mapping exists.
    pub fn map_role(&self, desired: &RoleMapping) -> MappingResult<Convergence> {
        self.converge(desired)
    }

    /// Ensure `desired` user mapping exists.
    pub fn map_user(&self, desired: &UserMapping) -> MappingResult<Convergence> {
        self.converge(desired)
    }

    fn converge<M: DesiredMapping>(&self, desired: &M) -> MappingResult<Convergence> {
        let kind = M::KIND.as_str();
        let principal = desired.principal_arn();

        if let Err(issues) = desired.validate() {
            let err = MappingError::Validation {
                kind: M::KIND,
                principal: principal.to_string(),
                issues,
            };
            self.reject(kind, principal, &err);
            return Err(err);
        }

        log_event_with_fields(
            Event::MappingConvergeStart,
            &[("arn", principal), ("kind", kind)],
        );

        let existing = self.store.list().map_err(|source| {
            let err = MappingError::List { source };
            self.reject(kind, principal, &err);
            err
        })?;

        // Linear scan; mapping lists are cluster-admin sized.
        if let Some(found) = existing
            .iter()
            .find(|record| record_matches(desired, record))
        {
            self.metrics.increment_mappings_unchanged();
            log_event_with_fields(
                Event::MappingUnchanged,
                &[
                    ("arn", principal),
                    ("kind", kind),
                    ("record", found.metadata.name.as_str()),
                ],
            );
            return Ok(Convergence::Unchanged {
                existing: found.metadata.name.clone(),
            });
        }

        let created = self
            .store
            .create(IdentityMappingRecord::generated(desired.to_spec()))
            .map_err(|source| {
                let err = MappingError::Create {
                    kind: M::KIND,
                    principal: principal.to_string(),
                    source,
                };
                self.reject(kind, principal, &err);
                err
            })?;

        self.metrics.increment_mappings_created();
        log_event_with_fields(
            Event::MappingCreated,
            &[
                ("arn", principal),
                ("kind", kind),
                ("record", created.metadata.name.as_str()),
                ("username", desired.username()),
            ],
        );
        Ok(Convergence::Created {
            name: created.metadata.name,
        })
    }

    fn reject(&self, kind: &str, principal: &str, err: &MappingError) {
        let error = err.to_string();
        log_event_with_fields(
            Event::MappingRejected,
            &[("arn", principal), ("error", error.as_str()), ("kind", kind)],
        );
    }
}
