//! # Local Mapping Store
//!
//! JSON-file backed store used by the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::state_file;

use super::errors::{StoreError, StoreResult};
use super::memory::assign_identity;
use super::store::MappingStore;
use super::types::IdentityMappingRecord;

/// File name of the store inside the state directory
pub const MAPPING_FILE: &str = "mappings.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct MappingList {
    #[serde(default)]
    items: Vec<IdentityMappingRecord>,
}

/// JSON-file backed mapping store
#[derive(Debug)]
pub struct LocalMappingStore {
    path: PathBuf,
}

impl LocalMappingStore {
    /// Use `<state_dir>/mappings.json`.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(MAPPING_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<MappingList> {
        state_file::load(&self.path).map_err(|e| StoreError::Io(e.to_string()))
    }
}

impl MappingStore for LocalMappingStore {
    fn list(&self) -> StoreResult<Vec<IdentityMappingRecord>> {
        Ok(self.load()?.items)
    }

    fn create(&self, mut record: IdentityMappingRecord) -> StoreResult<IdentityMappingRecord> {
        let mut list = self.load()?;
        assign_identity(&mut record)?;

        if list.items.iter().any(|r| {
            r.metadata.name == record.metadata.name
                && r.metadata.namespace == record.metadata.namespace
        }) {
            return Err(StoreError::Conflict(record.metadata.name));
        }

        list.items.push(record.clone());
        state_file::save(&self.path, &list).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(record)
    }
}
