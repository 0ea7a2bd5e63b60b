//! # Address Lifecycle Module
//!
//! Acquire, tag and safely release the elastic IPs a cluster owns.

pub mod api;
pub mod errors;
pub mod local;
pub mod manager;
pub mod memory;
pub mod types;

pub use api::AddressApi;
pub use errors::{AddressError, AddressResult};
pub use local::LocalAddressApi;
pub use manager::{release_retryable_codes, AddressLifecycleManager};
pub use memory::InMemoryAddressApi;
pub use types::{
    cluster_tag_key, AddressDomain, Allocation, ManagedAddress, ResourceLifecycle,
    CLUSTER_TAG_PREFIX,
};
