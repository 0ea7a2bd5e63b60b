//! clusterward - converge a cluster's elastic IPs and IAM identity mappings
//!
//! Two independent components, each taking its remote collaborator as an
//! injected trait object or generic parameter:
//!
//! - [`address::AddressLifecycleManager`] allocates, tags and safely releases
//!   addresses, retrying transient release failures through a
//!   [`retry::RetryExecutor`].
//! - [`mapping::MappingConvergenceEngine`] ensures role and user mappings
//!   exist in a [`mapping::MappingStore`] without duplicating or altering
//!   existing records.

pub mod address;
pub mod cli;
pub mod error;
pub mod mapping;
pub mod observability;
pub mod retry;
pub mod state_file;

pub use error::{ErrorKind, RemoteError, RemoteErrorCode, RemoteResult};
