//! # Identity Mapping Module
//!
//! Additive convergence of IAM role and user mappings into the cluster's
//! mapping store. Records are only ever created, never updated or deleted,
//! and pre-existing duplicates are left alone.

pub mod engine;
pub mod errors;
pub mod local;
pub mod matching;
pub mod memory;
pub mod store;
pub mod types;

pub use engine::{Convergence, MappingConvergenceEngine};
pub use errors::{MappingError, MappingResult, StoreError, StoreResult};
pub use local::LocalMappingStore;
pub use matching::{groups_equivalent, record_matches};
pub use memory::InMemoryMappingStore;
pub use store::MappingStore;
pub use types::{
    DesiredMapping, IdentityMappingRecord, MappingSpec, PrincipalKind, RecordMeta, RoleMapping,
    UserMapping, ValidationIssue, GENERATE_NAME_PREFIX, SYSTEM_NAMESPACE,
};
