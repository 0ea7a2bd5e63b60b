//! # Address Provider Trait

use std::sync::Arc;

use crate::error::RemoteResult;

use super::types::{AddressDomain, Allocation, ManagedAddress, ResourceLifecycle};

/// The cloud provider's address inventory.
///
/// Implementations translate provider error codes into
/// [`RemoteErrorCode`](crate::error::RemoteErrorCode) before returning.
pub trait AddressApi: Send + Sync {
    /// Allocate a new address
    fn allocate(&self, domain: AddressDomain) -> RemoteResult<Allocation>;

    /// List addresses tagged for `owner`, in provider order
    fn describe_filtered(&self, owner: &str) -> RemoteResult<Vec<ManagedAddress>>;

    /// Release an allocation
    fn release(&self, allocation_id: &str) -> RemoteResult<()>;

    /// Apply the ownership tag for `owner`
    fn tag(
        &self,
        allocation_id: &str,
        owner: &str,
        lifecycle: ResourceLifecycle,
    ) -> RemoteResult<()>;
}

impl<T: AddressApi + ?Sized> AddressApi for Arc<T> {
    fn allocate(&self, domain: AddressDomain) -> RemoteResult<Allocation> {
        (**self).allocate(domain)
    }

    fn describe_filtered(&self, owner: &str) -> RemoteResult<Vec<ManagedAddress>> {
        (**self).describe_filtered(owner)
    }

    fn release(&self, allocation_id: &str) -> RemoteResult<()> {
        (**self).release(allocation_id)
    }

    fn tag(
        &self,
        allocation_id: &str,
        owner: &str,
        lifecycle: ResourceLifecycle,
    ) -> RemoteResult<()> {
        (**self).tag(allocation_id, owner, lifecycle)
    }
}
