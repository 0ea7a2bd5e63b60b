//! # In-Memory Mapping Store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::store::MappingStore;
use super::types::IdentityMappingRecord;

/// Length of the random suffix appended to `generate_name`
const NAME_SUFFIX_LEN: usize = 5;

/// Fill in the name and creation time the store is responsible for.
pub(crate) fn assign_identity(record: &mut IdentityMappingRecord) -> StoreResult<()> {
    if record.metadata.name.is_empty() {
        let prefix = record.metadata.generate_name.as_deref().ok_or_else(|| {
            StoreError::Invalid("record has neither name nor generate_name".into())
        })?;
        let suffix = Uuid::new_v4().simple().to_string();
        record.metadata.name = format!("{}{}", prefix, &suffix[..NAME_SUFFIX_LEN]);
    }
    record.metadata.created_at = Some(Utc::now());
    Ok(())
}

/// In-memory mapping store for tests
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    records: RwLock<Vec<IdentityMappingRecord>>,
    list_failure: RwLock<Option<StoreError>>,
    create_failure: RwLock<Option<StoreError>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing record without counting it as a create.
    pub fn insert(&self, record: IdentityMappingRecord) {
        if let Ok(mut records) = self.records.write() {
            records.push(record);
        }
    }

    pub fn fail_list(&self, error: StoreError) {
        if let Ok(mut slot) = self.list_failure.write() {
            *slot = Some(error);
        }
    }

    pub fn fail_create(&self, error: StoreError) {
        if let Ok(mut slot) = self.create_failure.write() {
            *slot = Some(error);
        }
    }

    pub fn records(&self) -> Vec<IdentityMappingRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

fn poisoned() -> StoreError {
    StoreError::Io("Lock poisoned".to_string())
}

impl MappingStore for InMemoryMappingStore {
    fn list(&self) -> StoreResult<Vec<IdentityMappingRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_failure.read().map_err(|_| poisoned())?.clone() {
            return Err(err);
        }
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.clone())
    }

    fn create(&self, mut record: IdentityMappingRecord) -> StoreResult<IdentityMappingRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.create_failure.read().map_err(|_| poisoned())?.clone() {
            return Err(err);
        }

        assign_identity(&mut record)?;

        let mut records = self.records.write().map_err(|_| poisoned())?;
        if records.iter().any(|r| {
            r.metadata.name == record.metadata.name
                && r.metadata.namespace == record.metadata.namespace
        }) {
            return Err(StoreError::Conflict(record.metadata.name));
        }
        records.push(record.clone());
        Ok(record)
    }
}
