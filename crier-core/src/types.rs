//! Domain types for the crier publication registry.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde + serde_yaml. Maps are
//! `BTreeMap` so the registry file keeps a stable key order and diffs cleanly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Schema version written by this build. Anything else is rejected on load.
pub const CURRENT_VERSION: u32 = 2;

/// Keys this build does not know about, kept so they survive a load/save cycle.
pub type Extra = BTreeMap<String, serde_yaml::Value>;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The durable identity of an article, independent of where its file lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(pub String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CanonicalUrl {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CanonicalUrl {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A publishing platform key (`devto`, `bluesky`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformName(pub String);

impl PlatformName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PlatformName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PlatformName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Publication sub-records
// ---------------------------------------------------------------------------

/// Which platform call a recorded failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedOperation {
    /// A publish or update; retrying re-sends the content.
    #[default]
    Publish,
    /// A delete; only another delete resolves it.
    Delete,
}

impl FailedOperation {
    pub fn is_publish(&self) -> bool {
        matches!(self, FailedOperation::Publish)
    }
}

/// The most recent failed attempt on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationError {
    pub message: String,
    pub failed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "FailedOperation::is_publish")]
    pub operation: FailedOperation,
}

/// Engagement counters as reported by a platform. `None` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCounts {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub reposts: Option<u64>,
}

/// Cached stats for one publication.
///
/// Unknown counters serialize as explicit `null` rather than being omitted,
/// so a refresh never leaves an older value behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub reposts: Option<u64>,
    pub fetched_at: DateTime<Utc>,
}

impl Stats {
    pub fn from_counts(counts: StatCounts, fetched_at: DateTime<Utc>) -> Self {
        Self {
            views: counts.views,
            likes: counts.likes,
            comments: counts.comments,
            reposts: counts.reposts,
            fetched_at,
        }
    }

    pub fn counts(&self) -> StatCounts {
        StatCounts {
            views: self.views,
            likes: self.likes,
            comments: self.comments,
            reposts: self.reposts,
        }
    }
}

/// Everything the registry knows about one article on one platform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformPublication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Hash of exactly what was sent to this platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<ContentHash>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub rewritten: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_thread: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thread_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thread_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<PublicationError>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PlatformPublication {
    /// At least one successful publish has been recorded.
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Published and not soft-deleted.
    pub fn is_live(&self) -> bool {
        self.is_published() && !self.is_deleted()
    }

    /// Live, and the stored hash equals `hash`. A missing stored hash never matches.
    pub fn is_current(&self, hash: &ContentHash) -> bool {
        self.is_live() && self.content_hash.as_ref() == Some(hash)
    }
}

// ---------------------------------------------------------------------------
// Article records
// ---------------------------------------------------------------------------

/// One tracked article and its per-platform publications.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<ContentHash>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub platforms: BTreeMap<PlatformName, PlatformPublication>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Root of the persisted registry document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    pub version: u32,
    #[serde(default)]
    pub articles: BTreeMap<CanonicalUrl, ArticleRecord>,
}

impl Default for RegistryState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            articles: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Platform call outcomes
// ---------------------------------------------------------------------------

/// Result of a publish or update call against a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A single post was created or updated.
    Success {
        article_id: String,
        url: Option<String>,
    },
    /// A thread of linked posts; the root identifies the publication.
    Thread {
        root_id: String,
        root_url: Option<String>,
        ids: Vec<String>,
        urls: Vec<String>,
    },
    /// The call failed; nothing was published.
    Failure { message: String },
}

impl PublishOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure { .. })
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
