//! Per-item results and the three-way batch outcome.
//!
//! | outcome | exit code | meaning                          |
//! |---------|-----------|----------------------------------|
//! | Success | 0         | every attempt succeeded, or none |
//! | Partial | 2         | some succeeded, some failed      |
//! | Failure | 1         | every attempt failed             |

use std::path::PathBuf;

use serde::Serialize;

use crier_core::{CanonicalUrl, PlatformName};

/// Collapsed result of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Success,
    Partial,
    Failure,
}

impl BatchOutcome {
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => Self::Success,
            (0, _) => Self::Failure,
            _ => Self::Partial,
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

/// What happened to one (article, platform) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Published { article_id: String, url: Option<String> },
    Updated { article_id: String, url: Option<String> },
    Deleted,
    StatsRefreshed,
    WouldPublish,
    WouldUpdate,
    /// Not attempted.
    Skipped { reason: String },
    Failed { message: String },
}

impl ItemStatus {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_attempt(&self) -> bool {
        !matches!(self, Self::Skipped { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub canonical_url: Option<CanonicalUrl>,
    pub platform: PlatformName,
    pub path: Option<PathBuf>,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Ordered item results of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub items: Vec<ItemResult>,
}

impl BatchReport {
    pub fn push(&mut self, item: ItemResult) {
        self.items.push(item);
    }

    pub fn attempted(&self) -> usize {
        self.items.iter().filter(|i| i.status.is_attempt()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| i.status.is_failure()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.attempted() - self.failed()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.attempted()
    }

    pub fn outcome(&self) -> BatchOutcome {
        BatchOutcome::from_counts(self.succeeded(), self.failed())
    }
}
