//! # Address Lifecycle
//!
//! Allocation, ownership tagging and safe release of a cluster's elastic IPs.
//!
//! # Invariants
//!
//! - An address with an association is never released; the release call is
//!   not even issued for it.
//! - An allocation that could not be tagged is reported as a failure and left
//!   in place for cleanup.
//! - Release walks addresses in provider order and stops at the first fatal
//!   error, naming the addresses it never tried.

use std::sync::Arc;

use crate::error::RemoteErrorCode;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::retry::{BackoffPolicy, RetryExecutor, RetryableCodes};

use super::api::AddressApi;
use super::errors::{AddressError, AddressResult};
use super::types::{AddressDomain, ManagedAddress, ResourceLifecycle};

/// Release failures worth retrying: credentials still propagating, or the
/// provider not yet seeing a fresh disassociation.
pub fn release_retryable_codes() -> RetryableCodes {
    RetryableCodes::new([
        RemoteErrorCode::AuthFailure,
        RemoteErrorCode::InvalidIpAddressInUse,
    ])
}

/// Owns allocation, tagging and release of addresses for clusters.
pub struct AddressLifecycleManager<A: AddressApi> {
    api: A,
    retry: Arc<dyn RetryExecutor>,
    policy: BackoffPolicy,
    metrics: Arc<MetricsRegistry>,
}

impl<A: AddressApi> AddressLifecycleManager<A> {
    pub fn new(api: A, retry: Arc<dyn RetryExecutor>, policy: BackoffPolicy) -> Self {
        Self {
            api,
            retry,
            policy,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Share a metrics registry with other components.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Allocate a VPC address and tag it as owned by `owner`.
    ///
    /// Not idempotent: every call creates a new address.
    pub fn allocate(&self, owner: &str) -> AddressResult<String> {
        validate_owner(owner)?;
        log_event_with_fields(Event::AllocateStart, &[("cluster", owner)]);

        let allocation = self
            .api
            .allocate(AddressDomain::Vpc)
            .map_err(|source| AddressError::Allocate { source })?;

        if let Err(source) = self
            .api
            .tag(&allocation.allocation_id, owner, ResourceLifecycle::Owned)
        {
            self.metrics.increment_tag_failures();
            let error = source.to_string();
            log_event_with_fields(
                Event::AddressTagFailed,
                &[
                    ("allocation_id", allocation.allocation_id.as_str()),
                    ("cluster", owner),
                    ("error", error.as_str()),
                ],
            );
            return Err(AddressError::TagFailed {
                allocation_id: allocation.allocation_id,
                source,
            });
        }

        self.metrics.increment_addresses_allocated();
        log_event_with_fields(
            Event::AddressAllocated,
            &[
                ("allocation_id", allocation.allocation_id.as_str()),
                ("cluster", owner),
                ("public_ip", allocation.public_ip.as_str()),
            ],
        );
        Ok(allocation.allocation_id)
    }

    /// Release every address tagged for `owner`.
    ///
    /// Safe to re-drive: addresses released by an earlier run are no longer
    /// returned by the provider.
    pub fn release(&self, owner: &str) -> AddressResult<()> {
        validate_owner(owner)?;
        log_event_with_fields(Event::ReleaseStart, &[("cluster", owner)]);

        let addresses = self
            .api
            .describe_filtered(owner)
            .map_err(|source| AddressError::Describe {
                owner: owner.to_string(),
                source,
            })?;

        let retryable = release_retryable_codes();
        for (index, address) in addresses.iter().enumerate() {
            let remaining = &addresses[index + 1..];

            if let Some(association_id) = address.active_association() {
                let err = AddressError::StillAssociated {
                    public_ip: address.public_ip.clone(),
                    allocation_id: address.allocation_id.clone(),
                    association_id: association_id.to_string(),
                    not_attempted: allocation_ids(remaining),
                };
                self.abort_release(owner, &err);
                return Err(err);
            }

            let mut release = || self.api.release(&address.allocation_id);
            match self.retry.run(&mut release, &self.policy, &retryable) {
                Ok(attempts) => {
                    self.metrics
                        .add_release_retries(u64::from(attempts.saturating_sub(1)));
                    self.metrics.increment_addresses_released();
                    log_event_with_fields(
                        Event::AddressReleased,
                        &[
                            ("allocation_id", address.allocation_id.as_str()),
                            ("public_ip", address.public_ip.as_str()),
                        ],
                    );
                }
                Err(source) => {
                    self.metrics
                        .add_release_retries(u64::from(source.attempts().saturating_sub(1)));
                    let err = AddressError::Release {
                        public_ip: address.public_ip.clone(),
                        allocation_id: address.allocation_id.clone(),
                        not_attempted: allocation_ids(remaining),
                        source,
                    };
                    self.abort_release(owner, &err);
                    return Err(err);
                }
            }
        }

        let released = addresses.len().to_string();
        log_event_with_fields(
            Event::ReleaseComplete,
            &[("cluster", owner), ("released", released.as_str())],
        );
        Ok(())
    }

    fn abort_release(&self, owner: &str, err: &AddressError) {
        self.metrics.increment_release_failures();
        let kind = err.kind().to_string();
        let error = err.to_string();
        log_event_with_fields(
            Event::ReleaseAborted,
            &[
                ("allocation_id", err.allocation_id().unwrap_or_default()),
                ("cluster", owner),
                ("error", error.as_str()),
                ("kind", kind.as_str()),
            ],
        );
    }
}

fn validate_owner(owner: &str) -> AddressResult<()> {
    if owner.trim().is_empty() || owner.chars().any(char::is_whitespace) {
        return Err(AddressError::InvalidOwner(owner.to_string()));
    }
    Ok(())
}

fn allocation_ids(addresses: &[ManagedAddress]) -> Vec<String> {
    addresses
        .iter()
        .map(|address| address.allocation_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::InMemoryAddressApi;
    use crate::error::{ErrorKind, RemoteError};
    use crate::retry::{BackoffExecutor, RecordingSleeper};

    fn manager() -> AddressLifecycleManager<Arc<InMemoryAddressApi>> {
        AddressLifecycleManager::new(
            Arc::new(InMemoryAddressApi::new()),
            Arc::new(BackoffExecutor::with_sleeper(RecordingSleeper::new())),
            BackoffPolicy::fixed_steps(1, 2.0, 4),
        )
    }

    #[test]
    fn test_allocate_tags_owned() {
        let mgr = manager();
        let id = mgr.allocate("prod").unwrap();

        let addresses = mgr.api().describe_filtered("prod").unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].allocation_id, id);
        assert_eq!(
            addresses[0].lifecycle_for("prod"),
            Some(ResourceLifecycle::Owned)
        );
        assert_eq!(mgr.metrics().snapshot().addresses_allocated, 1);
    }

    #[test]
    fn test_allocate_rejects_blank_owner() {
        let mgr = manager();
        let err = mgr.allocate("  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(mgr.api().addresses().is_empty());
    }

    #[test]
    fn test_tag_failure_leaves_address() {
        let mgr = manager();
        mgr.api()
            .fail_tagging(RemoteError::from_provider("UnauthorizedOperation", "no tags"));

        let err = mgr.allocate("prod").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartialTagFailure);

        let all = mgr.api().addresses();
        assert_eq!(all.len(), 1);
        assert_eq!(err.allocation_id(), Some(all[0].allocation_id.as_str()));
        assert!(all[0].tags.is_empty());
        assert_eq!(mgr.metrics().snapshot().tag_failures, 1);
    }

    #[test]
    fn test_release_only_own_cluster() {
        let mgr = manager();
        mgr.api().insert(
            ManagedAddress::new("eipalloc-a", "198.51.100.1")
                .with_owner("prod", ResourceLifecycle::Owned),
        );
        mgr.api().insert(
            ManagedAddress::new("eipalloc-b", "198.51.100.2")
                .with_owner("staging", ResourceLifecycle::Owned),
        );

        mgr.release("prod").unwrap();

        let left: Vec<_> = mgr
            .api()
            .addresses()
            .into_iter()
            .map(|a| a.allocation_id)
            .collect();
        assert_eq!(left, vec!["eipalloc-b".to_string()]);
    }

    #[test]
    fn test_release_nothing_is_ok() {
        let mgr = manager();
        mgr.release("prod").unwrap();
        assert_eq!(mgr.metrics().snapshot().addresses_released, 0);
    }
}
