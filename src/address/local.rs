//! # Local Address Provider
//!
//! Keeps the address inventory in a JSON file so the CLI can be driven
//! without a cloud account. Provider-side behavior mirrors the real API:
//! unknown allocations are `InvalidAllocationID.NotFound`, associated ones
//! are `InvalidIPAddress.InUse`.

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RemoteError, RemoteErrorCode, RemoteResult};
use crate::state_file;

use super::api::AddressApi;
use super::types::{cluster_tag_key, AddressDomain, Allocation, ManagedAddress, ResourceLifecycle};

/// File name of the inventory inside the state directory
pub const ADDRESS_FILE: &str = "addresses.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Inventory {
    #[serde(default)]
    addresses: Vec<ManagedAddress>,
}

/// JSON-file backed address provider
#[derive(Debug)]
pub struct LocalAddressApi {
    path: PathBuf,
}

impl LocalAddressApi {
    /// Use `<state_dir>/addresses.json`.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(ADDRESS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every address in the inventory.
    pub fn list_all(&self) -> RemoteResult<Vec<ManagedAddress>> {
        Ok(self.load()?.addresses)
    }

    fn load(&self) -> RemoteResult<Inventory> {
        state_file::load(&self.path).map_err(|e| RemoteError::unclassified(e.to_string()))
    }

    fn save(&self, inventory: &Inventory) -> RemoteResult<()> {
        state_file::save(&self.path, inventory)
            .map_err(|e| RemoteError::unclassified(e.to_string()))
    }
}

fn not_found(allocation_id: &str) -> RemoteError {
    RemoteError::new(
        RemoteErrorCode::AllocationNotFound,
        format!("The allocation ID '{}' does not exist", allocation_id),
    )
}

fn documentation_address() -> String {
    let mut rng = rand::thread_rng();
    Ipv4Addr::new(203, 0, 113, rng.gen_range(1..=254)).to_string()
}

impl AddressApi for LocalAddressApi {
    fn allocate(&self, _domain: AddressDomain) -> RemoteResult<Allocation> {
        let mut inventory = self.load()?;

        let id = Uuid::new_v4().simple().to_string();
        let allocation = Allocation {
            allocation_id: format!("eipalloc-{}", &id[..17]),
            public_ip: documentation_address(),
        };
        inventory.addresses.push(ManagedAddress::new(
            allocation.allocation_id.clone(),
            allocation.public_ip.clone(),
        ));

        self.save(&inventory)?;
        Ok(allocation)
    }

    fn describe_filtered(&self, owner: &str) -> RemoteResult<Vec<ManagedAddress>> {
        Ok(self
            .load()?
            .addresses
            .into_iter()
            .filter(|a| a.belongs_to(owner))
            .collect())
    }

    fn release(&self, allocation_id: &str) -> RemoteResult<()> {
        let mut inventory = self.load()?;
        let position = inventory
            .addresses
            .iter()
            .position(|a| a.allocation_id == allocation_id)
            .ok_or_else(|| not_found(allocation_id))?;

        if inventory.addresses[position].is_associated() {
            return Err(RemoteError::new(
                RemoteErrorCode::InvalidIpAddressInUse,
                format!("Address '{}' is in use", allocation_id),
            ));
        }

        inventory.addresses.remove(position);
        self.save(&inventory)
    }

    fn tag(
        &self,
        allocation_id: &str,
        owner: &str,
        lifecycle: ResourceLifecycle,
    ) -> RemoteResult<()> {
        let mut inventory = self.load()?;
        let address = inventory
            .addresses
            .iter_mut()
            .find(|a| a.allocation_id == allocation_id)
            .ok_or_else(|| not_found(allocation_id))?;
        address
            .tags
            .insert(cluster_tag_key(owner), lifecycle.as_str().to_string());
        self.save(&inventory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_allocate_persists() {
        let dir = TempDir::new().unwrap();
        let api = LocalAddressApi::new(dir.path());
        let allocation = api.allocate(AddressDomain::Vpc).unwrap();
        api.tag(&allocation.allocation_id, "prod", ResourceLifecycle::Owned)
            .unwrap();

        let reopened = LocalAddressApi::new(dir.path());
        let found = reopened.describe_filtered("prod").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].allocation_id, allocation.allocation_id);
        assert!(found[0].public_ip.starts_with("203.0.113."));
    }

    #[test]
    fn test_release_removes() {
        let dir = TempDir::new().unwrap();
        let api = LocalAddressApi::new(dir.path());
        let allocation = api.allocate(AddressDomain::Vpc).unwrap();

        api.release(&allocation.allocation_id).unwrap();
        assert!(api.list_all().unwrap().is_empty());

        let err = api.release(&allocation.allocation_id).unwrap_err();
        assert_eq!(err.code, RemoteErrorCode::AllocationNotFound);
    }

    #[test]
    fn test_untagged_not_described() {
        let dir = TempDir::new().unwrap();
        let api = LocalAddressApi::new(dir.path());
        api.allocate(AddressDomain::Vpc).unwrap();
        assert!(api.describe_filtered("prod").unwrap().is_empty());
    }
}
