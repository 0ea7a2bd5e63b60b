//! # Mapping Store Trait

use std::sync::Arc;

use super::errors::StoreResult;
use super::types::IdentityMappingRecord;

/// The remote store holding identity mapping records.
///
/// No compare-and-swap is offered: a caller that lists, finds nothing and
/// creates can race another caller doing the same.
pub trait MappingStore: Send + Sync {
    /// Every record currently in the store
    fn list(&self) -> StoreResult<Vec<IdentityMappingRecord>>;

    /// Create `record`, assigning a name from `generate_name` when `name` is
    /// empty. Returns the stored record.
    fn create(&self, record: IdentityMappingRecord) -> StoreResult<IdentityMappingRecord>;
}

impl<T: MappingStore + ?Sized> MappingStore for Arc<T> {
    fn list(&self) -> StoreResult<Vec<IdentityMappingRecord>> {
        (**self).list()
    }

    fn create(&self, record: IdentityMappingRecord) -> StoreResult<IdentityMappingRecord> {
        (**self).create(record)
    }
}
