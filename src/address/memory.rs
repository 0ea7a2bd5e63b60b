//! # In-Memory Address Provider
//!
//! A scriptable stand-in for the cloud provider, used by tests and dry runs.
//! Failures can be queued per allocation id; every release call is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use crate::error::{RemoteError, RemoteErrorCode, RemoteResult};

use super::api::AddressApi;
use super::types::{cluster_tag_key, AddressDomain, Allocation, ManagedAddress, ResourceLifecycle};

#[derive(Debug, Default)]
struct State {
    addresses: Vec<ManagedAddress>,
    next_id: u64,
    queued_release_failures: HashMap<String, VecDeque<RemoteError>>,
    sticky_release_failures: HashMap<String, RemoteError>,
    allocate_failure: Option<RemoteError>,
    describe_failure: Option<RemoteError>,
    tag_failure: Option<RemoteError>,
    release_calls: Vec<String>,
    tag_calls: usize,
}

/// In-memory address provider
#[derive(Debug, Default)]
pub struct InMemoryAddressApi {
    state: RwLock<State>,
}

fn poisoned() -> RemoteError {
    RemoteError::unclassified("Lock poisoned")
}

impl InMemoryAddressApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing address.
    pub fn insert(&self, address: ManagedAddress) {
        if let Ok(mut state) = self.state.write() {
            state.addresses.push(address);
        }
    }

    /// Bind an address to a consumer.
    pub fn associate(&self, allocation_id: &str, association_id: &str) {
        if let Ok(mut state) = self.state.write() {
            if let Some(address) = state
                .addresses
                .iter_mut()
                .find(|a| a.allocation_id == allocation_id)
            {
                address.association_id = Some(association_id.to_string());
            }
        }
    }

    /// Fail the next releases of `allocation_id` with `errors`, in order.
    pub fn queue_release_failures(&self, allocation_id: &str, errors: Vec<RemoteError>) {
        if let Ok(mut state) = self.state.write() {
            state
                .queued_release_failures
                .entry(allocation_id.to_string())
                .or_default()
                .extend(errors);
        }
    }

    /// Fail every release of `allocation_id` with `error`.
    pub fn fail_release_always(&self, allocation_id: &str, error: RemoteError) {
        if let Ok(mut state) = self.state.write() {
            state
                .sticky_release_failures
                .insert(allocation_id.to_string(), error);
        }
    }

    pub fn fail_allocation(&self, error: RemoteError) {
        if let Ok(mut state) = self.state.write() {
            state.allocate_failure = Some(error);
        }
    }

    pub fn fail_describe(&self, error: RemoteError) {
        if let Ok(mut state) = self.state.write() {
            state.describe_failure = Some(error);
        }
    }

    pub fn fail_tagging(&self, error: RemoteError) {
        if let Ok(mut state) = self.state.write() {
            state.tag_failure = Some(error);
        }
    }

    /// All addresses, tagged or not.
    pub fn addresses(&self) -> Vec<ManagedAddress> {
        self.state
            .read()
            .map(|state| state.addresses.clone())
            .unwrap_or_default()
    }

    /// Number of release calls made for `allocation_id`.
    pub fn release_calls(&self, allocation_id: &str) -> usize {
        self.state
            .read()
            .map(|state| {
                state
                    .release_calls
                    .iter()
                    .filter(|id| id.as_str() == allocation_id)
                    .count()
            })
            .unwrap_or_default()
    }

    /// Number of tag calls, failed ones included.
    pub fn tag_calls(&self) -> usize {
        self.state
            .read()
            .map(|state| state.tag_calls)
            .unwrap_or_default()
    }

    /// Every release call, in order.
    pub fn release_log(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.release_calls.clone())
            .unwrap_or_default()
    }
}

impl AddressApi for InMemoryAddressApi {
    fn allocate(&self, _domain: AddressDomain) -> RemoteResult<Allocation> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        if let Some(err) = state.allocate_failure.clone() {
            return Err(err);
        }

        state.next_id += 1;
        let allocation = Allocation {
            allocation_id: format!("eipalloc-{:017x}", state.next_id),
            public_ip: format!("198.51.100.{}", state.next_id % 254 + 1),
        };
        state.addresses.push(ManagedAddress::new(
            allocation.allocation_id.clone(),
            allocation.public_ip.clone(),
        ));
        Ok(allocation)
    }

    fn describe_filtered(&self, owner: &str) -> RemoteResult<Vec<ManagedAddress>> {
        let state = self.state.read().map_err(|_| poisoned())?;
        if let Some(err) = state.describe_failure.clone() {
            return Err(err);
        }
        Ok(state
            .addresses
            .iter()
            .filter(|a| a.belongs_to(owner))
            .cloned()
            .collect())
    }

    fn release(&self, allocation_id: &str) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.release_calls.push(allocation_id.to_string());

        if let Some(err) = state
            .queued_release_failures
            .get_mut(allocation_id)
            .and_then(VecDeque::pop_front)
        {
            return Err(err);
        }
        if let Some(err) = state.sticky_release_failures.get(allocation_id) {
            return Err(err.clone());
        }

        let position = state
            .addresses
            .iter()
            .position(|a| a.allocation_id == allocation_id)
            .ok_or_else(|| {
                RemoteError::new(
                    RemoteErrorCode::AllocationNotFound,
                    format!("allocation {} does not exist", allocation_id),
                )
            })?;

        if state.addresses[position].is_associated() {
            return Err(RemoteError::new(
                RemoteErrorCode::InvalidIpAddressInUse,
                format!("address {} is in use", allocation_id),
            ));
        }

        state.addresses.remove(position);
        Ok(())
    }

    fn tag(
        &self,
        allocation_id: &str,
        owner: &str,
        lifecycle: ResourceLifecycle,
    ) -> RemoteResult<()> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.tag_calls += 1;
        if let Some(err) = state.tag_failure.clone() {
            return Err(err);
        }

        let address = state
            .addresses
            .iter_mut()
            .find(|a| a.allocation_id == allocation_id)
            .ok_or_else(|| {
                RemoteError::new(
                    RemoteErrorCode::AllocationNotFound,
                    format!("allocation {} does not exist", allocation_id),
                )
            })?;
        address
            .tags
            .insert(cluster_tag_key(owner), lifecycle.as_str().to_string());
        Ok(())
    }
}
