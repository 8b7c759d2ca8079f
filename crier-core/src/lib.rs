//! Crier core library: publication registry, content hashing, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes, article/publication records, publish outcomes
//! - [`hash`]: algorithm-tagged content hashes
//! - [`store`]: registry file location, load / save, [`StateStore`]
//! - [`registry`]: [`Registry`] handle: mutations and queries
//! - [`error`]: [`RegistryError`]

pub mod error;
pub mod hash;
pub mod registry;
pub mod store;
pub mod types;

pub use error::RegistryError;
pub use hash::{hash, hash_file, ContentHash};
pub use registry::{FailureEntry, PlatformEntry, PublicationRecord, Registry};
pub use store::{FileStore, MemoryStore, StateStore, Txn};
pub use types::{
    ArticleRecord, CanonicalUrl, FailedOperation, PlatformName, PlatformPublication,
    PublicationError, PublishOutcome, RegistryState, StatCounts, Stats,
};
