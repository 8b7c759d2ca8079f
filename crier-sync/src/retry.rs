//! Retry controller: re-attempt every platform whose last attempt failed.

use std::path::Path;

use crier_core::{FailedOperation, FailureEntry, PublicationRecord, Registry, StateStore};

use crate::content::ContentLoader;
use crate::error::SyncError;
use crate::outcome::{BatchReport, ItemResult, ItemStatus};
use crate::platform::PlatformSet;
use crate::publish::{attempt, NOT_CONFIGURED};

pub(crate) const SOURCE_NOT_FOUND: &str = "source file not found";
pub(crate) const DELETE_PENDING: &str = "delete failed; run 'crier delete' again";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryOptions {
    /// Report what would be retried without calling platforms or writing.
    pub dry_run: bool,
}

/// Retry every recorded failure, in URL then platform order.
///
/// Only publish failures are re-sent. A failed delete is reported as skipped
/// since re-publishing would undo the intent.
///
/// `root` is the project root that recorded `source_file` paths are relative
/// to. A failing item never stops the batch; a registry error does.
pub fn retry_failures<S: StateStore>(
    registry: &Registry<S>,
    platforms: &PlatformSet,
    loader: &dyn ContentLoader,
    root: &Path,
    options: RetryOptions,
) -> Result<BatchReport, SyncError> {
    let failures = registry.get_failures()?;
    tracing::debug!("{} failure(s) to retry", failures.len());

    let mut report = BatchReport::default();
    for failure in &failures {
        let status = retry_one(registry, platforms, loader, root, failure, options)?;
        if let ItemStatus::Failed { message } = &status {
            tracing::warn!(
                "retry {} -> {} failed: {message}",
                failure.canonical_url,
                failure.platform
            );
        }
        report.push(ItemResult {
            canonical_url: Some(failure.canonical_url.clone()),
            platform: failure.platform.clone(),
            path: failure.source_file.clone(),
            status,
        });
    }
    Ok(report)
}

fn retry_one<S: StateStore>(
    registry: &Registry<S>,
    platforms: &PlatformSet,
    loader: &dyn ContentLoader,
    root: &Path,
    failure: &FailureEntry,
    options: RetryOptions,
) -> Result<ItemStatus, SyncError> {
    let url = &failure.canonical_url;
    if failure.operation == FailedOperation::Delete {
        return Ok(ItemStatus::skipped(DELETE_PENDING));
    }
    let Some(source) = &failure.source_file else {
        return Ok(ItemStatus::failed(SOURCE_NOT_FOUND));
    };
    let full_path = root.join(source);
    if !full_path.is_file() {
        return Ok(ItemStatus::failed(SOURCE_NOT_FOUND));
    }

    let article = match loader.load(&full_path) {
        Ok(Some(article)) => article,
        Ok(None) => return Ok(ItemStatus::failed("not an article")),
        Err(e) => return Ok(ItemStatus::failed(e.to_string())),
    };
    let content_hash = crier_core::hash_file(&full_path)?;

    let publication = registry.get_publication_info(url, &failure.platform)?;
    if publication
        .as_ref()
        .is_some_and(|p| p.is_current(&content_hash))
    {
        if !options.dry_run {
            registry.clear_failure(url, &failure.platform)?;
        }
        return Ok(ItemStatus::skipped("already up to date"));
    }
    let existing_id = publication
        .as_ref()
        .filter(|p| p.is_live())
        .and_then(|p| p.article_id.clone());

    if options.dry_run {
        return Ok(match existing_id {
            Some(_) => ItemStatus::WouldUpdate,
            None => ItemStatus::WouldPublish,
        });
    }

    let context = PublicationRecord {
        title: Some(article.title.clone()),
        source_file: Some(source.clone()),
        content_hash: Some(content_hash),
        ..PublicationRecord::default()
    };
    let Some(platform) = platforms.get(&failure.platform) else {
        registry.record_failure(url, &failure.platform, NOT_CONFIGURED, None, None)?;
        return Ok(ItemStatus::failed(NOT_CONFIGURED));
    };
    attempt(
        registry,
        platform,
        url,
        &failure.platform,
        &article,
        existing_id.as_deref(),
        context,
    )
}
