//! # crier-sync
//!
//! Reconciliation and batch controllers on top of the `crier-core` registry.
//!
//! [`audit::reconcile`] classifies every (content file, platform) pair as
//! missing, changed or up to date without touching anything. The controllers
//! ([`publish::publish_items`], [`retry::retry_failures`],
//! [`publish::delete_publication`], [`stats::refresh_stats`]) call platforms
//! and then fold each outcome into the registry. Batch results collapse into
//! a [`BatchOutcome`] whose [`exit_code`](BatchOutcome::exit_code) is the
//! process exit status.

pub mod audit;
pub mod content;
pub mod error;
pub mod outcome;
pub mod platform;
pub mod publish;
pub mod retry;
pub mod stats;

pub use audit::{reconcile, AuditItem, AuditOptions, AuditReport, AuditStatus};
pub use content::{Article, ContentFile, ContentLoader, FrontMatterLoader};
pub use error::SyncError;
pub use outcome::{BatchOutcome, BatchReport, ItemResult, ItemStatus};
pub use platform::{DeleteOutcome, Platform, PlatformSet};
