//! Registry persistence.
//!
//! # Storage layout
//!
//! ```text
//! <project>/
//!   .crier/
//!     registry.yaml       (mode 0600, written atomically)
//!     registry.yaml.tmp   (transient, only during a save)
//! ```
//!
//! # Transactions
//!
//! Every mutation goes through [`StateStore::transact`]: load the whole file,
//! apply one closure, save the whole file. There is no lock; two processes
//! mutating the same registry concurrently can lose an update. A hardened
//! store overrides `transact` to hold an exclusive lock across the cycle.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::error::{io_err, RegistryError};
use crate::types::{RegistryState, CURRENT_VERSION};

/// Name of the project-local registry directory.
pub const REGISTRY_DIR: &str = ".crier";
/// Name of the registry document inside [`REGISTRY_DIR`].
pub const REGISTRY_FILE: &str = "registry.yaml";

// ---------------------------------------------------------------------------
// 1. Location
// ---------------------------------------------------------------------------

/// Resolve the registry file for an invocation started in `start`.
///
/// Walks `start` and each parent looking for an existing `.crier/` directory.
/// When none exists anywhere above, the registry belongs in `start` itself;
/// nothing is created in a parent.
pub fn locate(start: &Path) -> PathBuf {
    let resolved = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    for dir in resolved.ancestors() {
        let candidate = dir.join(REGISTRY_DIR);
        if candidate.is_dir() {
            tracing::debug!("registry directory found at {}", candidate.display());
            return candidate.join(REGISTRY_FILE);
        }
    }
    start.join(REGISTRY_DIR).join(REGISTRY_FILE)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the registry document at `path`.
///
/// - absent file → empty registry at [`CURRENT_VERSION`]
/// - empty file → empty registry (there is no state to lose)
/// - malformed YAML or wrong shape → [`RegistryError::Parse`]
/// - any other `version` → [`RegistryError::UnsupportedVersion`]
pub fn load_at(path: &Path) -> Result<RegistryState, RegistryError> {
    if !path.exists() {
        return Ok(RegistryState::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(RegistryState::default());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(&contents).map_err(|e| {
        RegistryError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    if let serde_yaml::Value::Mapping(map) = &value {
        check_version(path, map.get("version"))?;
    }
    serde_yaml::from_value(value).map_err(|e| RegistryError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn check_version(path: &Path, version: Option<&serde_yaml::Value>) -> Result<(), RegistryError> {
    let found = match version {
        Some(v) if v.as_u64() == Some(u64::from(CURRENT_VERSION)) => return Ok(()),
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        Some(serde_yaml::Value::String(s)) => format!("{s:?}"),
        Some(_) => "of unexpected type".to_string(),
        None => "(missing)".to_string(),
    };
    Err(RegistryError::UnsupportedVersion {
        path: path.to_path_buf(),
        found,
        expected: CURRENT_VERSION,
    })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the registry document to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// The `.tmp` lives in the same directory as the target, so the rename never
/// crosses filesystems. On a failed rename the `.tmp` is removed and the
/// previous file is left untouched.
pub fn save_at(path: &Path, state: &RegistryState) -> Result<(), RegistryError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
    }
    let tmp_path = tmp_path_for(path);

    let yaml = serde_yaml::to_string(state)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    tracing::debug!("saved registry to {}", path.display());
    Ok(())
}

/// `<path>.tmp`: the staging file used by [`save_at`].
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| REGISTRY_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// 4. Transactional store interface
// ---------------------------------------------------------------------------

/// Result of a transaction closure: whether the mutated state should be saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Txn<T> {
    /// Persist the mutated state, then return the value.
    Commit(T),
    /// Discard the mutated state, return the value.
    Abort(T),
}

/// Load / mutate / save over one registry document.
pub trait StateStore {
    /// Read the full state.
    fn load(&self) -> Result<RegistryState, RegistryError>;

    /// Replace the full state.
    fn save(&self, state: &RegistryState) -> Result<(), RegistryError>;

    /// Human-readable location, used in messages.
    fn location(&self) -> String;

    /// Run one read-modify-write cycle.
    fn transact<T, F>(&self, f: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&mut RegistryState) -> Txn<T>,
    {
        let mut state = self.load()?;
        match f(&mut state) {
            Txn::Commit(value) => {
                self.save(&state)?;
                Ok(value)
            }
            Txn::Abort(value) => Ok(value),
        }
    }
}

/// YAML file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store found by walking up from `start` (see [`locate`]).
    pub fn discover(start: &Path) -> Self {
        Self::at(locate(start))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory that holds `.crier/`; source paths are recorded relative to it.
    pub fn project_root(&self) -> Option<&Path> {
        self.path.parent().and_then(Path::parent)
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<RegistryState, RegistryError> {
        load_at(&self.path)
    }

    fn save(&self, state: &RegistryState) -> Result<(), RegistryError> {
        save_at(&self.path, state)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store; nothing touches the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<RegistryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RegistryState) -> Self {
        Self {
            state: RefCell::new(state),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<RegistryState, RegistryError> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &RegistryState) -> Result<(), RegistryError> {
        *self.state.borrow_mut() = state.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), RegistryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), RegistryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
