//! Content hashing for drift detection.
//!
//! Hashes are rendered as `"<algorithm>:<hex digest>"`. The tag travels with
//! the value into the registry, so records written by an older algorithm
//! never compare equal to a hash produced by a newer one; they simply read
//! as "changed".

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, RegistryError};

/// Algorithm tag used for every hash this build produces.
pub const ALGORITHM: &str = "sha256";

/// An algorithm-tagged content digest.
///
/// Stored values are carried verbatim; equality is always on the full tagged
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash raw bytes with the current algorithm.
    pub fn of(content: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_ref());
        Self(format!("{ALGORITHM}:{}", hex::encode(hasher.finalize())))
    }

    /// The algorithm tag, or `None` for an untagged legacy value.
    pub fn algorithm(&self) -> Option<&str> {
        self.0.split_once(':').map(|(algo, _)| algo)
    }

    /// The digest part (the whole value when untagged).
    pub fn digest(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, digest)| digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContentHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Hash in-memory content.
pub fn hash(content: impl AsRef<[u8]>) -> ContentHash {
    ContentHash::of(content)
}

/// Read a file's bytes and hash them.
pub fn hash_file(path: &Path) -> Result<ContentHash, RegistryError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    Ok(ContentHash::of(bytes))
}
