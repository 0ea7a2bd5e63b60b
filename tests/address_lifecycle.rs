//! Address Lifecycle Tests
//!
//! Test Categories:
//! 1. Safety: associated addresses are never released
//! 2. Retry absorption of transient release failures
//! 3. Exhaustion of the retry budget
//! 4. Batch short-circuit on the first fatal error
//! 5. Allocation with a failed ownership tag
//! 6. Provider failures before any address is touched

use std::sync::Arc;
use std::time::Duration;

use clusterward::address::{
    AddressError, AddressLifecycleManager, InMemoryAddressApi, ManagedAddress, ResourceLifecycle,
};
use clusterward::retry::{BackoffExecutor, BackoffPolicy, RecordingSleeper, RetryError};
use clusterward::{ErrorKind, RemoteError, RemoteErrorCode};

const CLUSTER: &str = "prod";

fn manager_with(
    api: InMemoryAddressApi,
    policy: BackoffPolicy,
) -> (
    AddressLifecycleManager<InMemoryAddressApi>,
    Arc<BackoffExecutor<RecordingSleeper>>,
) {
    let executor = Arc::new(BackoffExecutor::with_sleeper(RecordingSleeper::new()));
    let manager = AddressLifecycleManager::new(api, executor.clone(), policy);
    (manager, executor)
}

fn owned(allocation_id: &str, ip: &str) -> ManagedAddress {
    ManagedAddress::new(allocation_id, ip).with_owner(CLUSTER, ResourceLifecycle::Owned)
}

fn auth_failure() -> RemoteError {
    RemoteError::from_provider("AuthFailure", "credentials not yet valid")
}

fn in_use() -> RemoteError {
    RemoteError::from_provider("InvalidIPAddress.InUse", "address in use")
}

// =============================================================================
// SAFETY
// =============================================================================

#[test]
fn test_associated_address_is_never_released() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1").with_association("eipassoc-9"));
    let (manager, executor) = manager_with(api, BackoffPolicy::default());

    let err = manager.release(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SafetyViolation);
    assert!(matches!(
        &err,
        AddressError::StillAssociated { association_id, .. } if association_id == "eipassoc-9"
    ));
    assert_eq!(manager.api().release_calls("eipalloc-1"), 0);
    assert_eq!(manager.api().addresses().len(), 1);
    assert!(executor.sleeper().delays().is_empty());
    assert_eq!(manager.metrics().snapshot().release_failures, 1);
}

#[test]
fn test_empty_association_id_counts_as_unassociated() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1").with_association(""));
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    manager.release(CLUSTER).unwrap();

    assert_eq!(manager.api().release_calls("eipalloc-1"), 1);
    assert!(manager.api().addresses().is_empty());
}

#[test]
fn test_other_clusters_addresses_untouched() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.insert(
        ManagedAddress::new("eipalloc-2", "198.51.100.2")
            .with_owner("staging", ResourceLifecycle::Owned),
    );
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    manager.release(CLUSTER).unwrap();

    assert_eq!(manager.api().release_log(), vec!["eipalloc-1".to_string()]);
    let remaining = manager.api().addresses();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].allocation_id, "eipalloc-2");
}

// =============================================================================
// RETRY ABSORPTION
// =============================================================================

#[test]
fn test_transient_release_failures_absorbed() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.queue_release_failures("eipalloc-1", vec![auth_failure(), auth_failure()]);
    let (manager, executor) = manager_with(api, BackoffPolicy::default());

    manager.release(CLUSTER).unwrap();

    assert_eq!(manager.api().release_calls("eipalloc-1"), 3);
    assert!(manager.api().addresses().is_empty());
    assert_eq!(executor.sleeper().delays().len(), 2);

    let snapshot = manager.metrics().snapshot();
    assert_eq!(snapshot.addresses_released, 1);
    assert_eq!(snapshot.release_retries, 2);
    assert_eq!(snapshot.release_failures, 0);
}

#[test]
fn test_in_use_is_retried_like_auth_failure() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.queue_release_failures("eipalloc-1", vec![in_use(), auth_failure(), in_use()]);
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    manager.release(CLUSTER).unwrap();

    assert_eq!(manager.api().release_calls("eipalloc-1"), 4);
}

#[test]
fn test_retry_delays_grow() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.queue_release_failures(
        "eipalloc-1",
        vec![auth_failure(), auth_failure(), auth_failure()],
    );
    let (manager, executor) = manager_with(api, BackoffPolicy::fixed_steps(100, 2.0, 5));

    manager.release(CLUSTER).unwrap();

    assert_eq!(
        executor.sleeper().delays(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
}

// =============================================================================
// EXHAUSTION
// =============================================================================

#[test]
fn test_exhaustion_after_step_budget() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.fail_release_always("eipalloc-1", auth_failure());
    let policy = BackoffPolicy::default();
    let steps = policy.steps;
    let (manager, executor) = manager_with(api, policy);

    let err = manager.release(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalRemote);
    match &err {
        AddressError::Release { source, .. } => {
            assert!(matches!(source, RetryError::Exhausted { .. }));
            assert_eq!(source.attempts(), steps);
            assert_eq!(
                source.last_error().map(|e| e.code.clone()),
                Some(RemoteErrorCode::AuthFailure)
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(manager.api().release_calls("eipalloc-1"), steps as usize);
    assert_eq!(executor.sleeper().delays().len(), steps as usize - 1);
    assert_eq!(manager.api().addresses().len(), 1);
}

#[test]
fn test_non_retryable_failure_is_immediate() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.fail_release_always(
        "eipalloc-1",
        RemoteError::from_provider("UnauthorizedOperation", "denied"),
    );
    let (manager, executor) = manager_with(api, BackoffPolicy::default());

    let err = manager.release(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalRemote);
    assert!(matches!(
        err,
        AddressError::Release {
            source: RetryError::Fatal { attempt: 1, .. },
            ..
        }
    ));
    assert_eq!(manager.api().release_calls("eipalloc-1"), 1);
    assert!(executor.sleeper().delays().is_empty());
}

// =============================================================================
// BATCH SHORT-CIRCUIT
// =============================================================================

#[test]
fn test_first_fatal_stops_the_batch() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.insert(owned("eipalloc-2", "198.51.100.2"));
    api.insert(owned("eipalloc-3", "198.51.100.3"));
    api.fail_release_always(
        "eipalloc-1",
        RemoteError::from_provider("InvalidAllocationID.NotFound", "gone"),
    );
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    let err = manager.release(CLUSTER).unwrap_err();

    assert_eq!(err.allocation_id(), Some("eipalloc-1"));
    assert_eq!(
        err.not_attempted(),
        &["eipalloc-2".to_string(), "eipalloc-3".to_string()]
    );
    assert!(err.to_string().contains("not attempted: eipalloc-2, eipalloc-3"));
    assert_eq!(manager.api().release_calls("eipalloc-2"), 0);
    assert_eq!(manager.api().release_calls("eipalloc-3"), 0);
}

#[test]
fn test_association_midway_keeps_earlier_releases() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.insert(owned("eipalloc-2", "198.51.100.2").with_association("eipassoc-2"));
    api.insert(owned("eipalloc-3", "198.51.100.3"));
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    let err = manager.release(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SafetyViolation);
    assert_eq!(err.not_attempted(), &["eipalloc-3".to_string()]);
    assert_eq!(manager.api().release_log(), vec!["eipalloc-1".to_string()]);

    let remaining: Vec<String> = manager
        .api()
        .addresses()
        .into_iter()
        .map(|a| a.allocation_id)
        .collect();
    assert_eq!(remaining, vec!["eipalloc-2", "eipalloc-3"]);
}

#[test]
fn test_release_is_rerunnable() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    manager.release(CLUSTER).unwrap();
    manager.release(CLUSTER).unwrap();

    assert_eq!(manager.api().release_calls("eipalloc-1"), 1);
}

// =============================================================================
// ALLOCATION
// =============================================================================

#[test]
fn test_allocate_tags_owned() {
    let (manager, _) = manager_with(InMemoryAddressApi::new(), BackoffPolicy::default());

    let allocation_id = manager.allocate(CLUSTER).unwrap();

    let addresses = manager.api().addresses();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].allocation_id, allocation_id);
    assert_eq!(
        addresses[0].lifecycle_for(CLUSTER),
        Some(ResourceLifecycle::Owned)
    );
    assert_eq!(manager.metrics().snapshot().addresses_allocated, 1);
}

#[test]
fn test_allocate_is_not_idempotent() {
    let (manager, _) = manager_with(InMemoryAddressApi::new(), BackoffPolicy::default());

    let first = manager.allocate(CLUSTER).unwrap();
    let second = manager.allocate(CLUSTER).unwrap();

    assert_ne!(first, second);
    assert_eq!(manager.api().addresses().len(), 2);
}

#[test]
fn test_tag_failure_leaves_untagged_address() {
    let api = InMemoryAddressApi::new();
    api.fail_tagging(RemoteError::from_provider("RequestLimitExceeded", "slow down"));
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    let err = manager.allocate(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PartialTagFailure);
    let allocation_id = err.allocation_id().map(str::to_string);
    let addresses = manager.api().addresses();
    assert_eq!(addresses.len(), 1);
    assert_eq!(Some(addresses[0].allocation_id.clone()), allocation_id);
    assert!(!addresses[0].belongs_to(CLUSTER));
    assert_eq!(manager.api().release_log().len(), 0);
    assert_eq!(manager.api().tag_calls(), 1);
    assert_eq!(manager.metrics().snapshot().tag_failures, 1);
}

#[test]
fn test_blank_cluster_rejected() {
    let (manager, _) = manager_with(InMemoryAddressApi::new(), BackoffPolicy::default());

    assert_eq!(manager.allocate("  ").unwrap_err().kind(), ErrorKind::Validation);
    assert_eq!(manager.release("").unwrap_err().kind(), ErrorKind::Validation);
    assert!(manager.api().addresses().is_empty());
}

// =============================================================================
// PROVIDER FAILURES
// =============================================================================

#[test]
fn test_allocation_failure_skips_tagging() {
    let api = InMemoryAddressApi::new();
    api.fail_allocation(RemoteError::from_provider("AddressLimitExceeded", "quota reached"));
    let (manager, _) = manager_with(api, BackoffPolicy::default());

    let err = manager.allocate(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalRemote);
    assert!(matches!(
        &err,
        AddressError::Allocate { source } if source.code == RemoteErrorCode::AddressLimitExceeded
    ));
    assert!(err.to_string().contains("quota reached"));
    assert!(manager.api().addresses().is_empty());
    assert_eq!(manager.api().tag_calls(), 0);

    let snapshot = manager.metrics().snapshot();
    assert_eq!(snapshot.addresses_allocated, 0);
    assert_eq!(snapshot.tag_failures, 0);
}

#[test]
fn test_describe_failure_releases_nothing() {
    let api = InMemoryAddressApi::new();
    api.insert(owned("eipalloc-1", "198.51.100.1"));
    api.fail_describe(RemoteError::from_provider("UnauthorizedOperation", "denied"));
    let (manager, executor) = manager_with(api, BackoffPolicy::default());

    let err = manager.release(CLUSTER).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FatalRemote);
    assert!(matches!(&err, AddressError::Describe { owner, .. } if owner == CLUSTER));
    assert!(err.to_string().contains("\"prod\""));
    assert!(err.not_attempted().is_empty());
    assert!(manager.api().release_log().is_empty());
    assert!(executor.sleeper().delays().is_empty());
    assert_eq!(manager.api().addresses().len(), 1);
}
