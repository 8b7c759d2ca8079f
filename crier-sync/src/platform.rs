//! Publishing platform interface.
//!
//! A platform performs the actual network calls; this crate only records what
//! they report. Failures are values ([`PublishOutcome::Failure`],
//! [`DeleteOutcome::Failed`]), never errors, so a batch can fold them into the
//! registry and carry on.

use std::collections::BTreeMap;

use crier_core::{PlatformName, PublishOutcome, StatCounts};

use crate::content::Article;

/// Result of a delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The platform has no delete operation.
    Unsupported,
    Failed { message: String },
}

pub trait Platform {
    /// Registry key for this platform.
    fn name(&self) -> &str;

    /// Create a new post (or thread).
    fn publish(&self, article: &Article) -> PublishOutcome;

    /// Replace the content of an existing post.
    fn update(&self, article_id: &str, article: &Article) -> PublishOutcome;

    fn delete(&self, _article_id: &str) -> DeleteOutcome {
        DeleteOutcome::Unsupported
    }

    /// Current engagement counters; `None` when the platform does not report any.
    fn get_stats(&self, _article_id: &str) -> Option<StatCounts> {
        None
    }
}

/// The configured platforms, keyed by name.
#[derive(Default)]
pub struct PlatformSet {
    platforms: BTreeMap<PlatformName, Box<dyn Platform>>,
}

impl PlatformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a platform under its own [`name`](Platform::name), replacing any
    /// earlier one with the same name.
    pub fn insert(&mut self, platform: Box<dyn Platform>) {
        let name = PlatformName::from(platform.name());
        self.platforms.insert(name, platform);
    }

    pub fn get(&self, name: &PlatformName) -> Option<&dyn Platform> {
        self.platforms.get(name).map(|p| p.as_ref())
    }
}

impl std::fmt::Debug for PlatformSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.platforms.keys()).finish()
    }
}

impl FromIterator<Box<dyn Platform>> for PlatformSet {
    fn from_iter<I: IntoIterator<Item = Box<dyn Platform>>>(iter: I) -> Self {
        let mut set = Self::new();
        for platform in iter {
            set.insert(platform);
        }
        set
    }
}
