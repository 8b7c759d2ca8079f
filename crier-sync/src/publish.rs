//! Bulk publish and delete controllers.
//!
//! Every platform call is made first and only then folded into the registry,
//! so an interrupted run leaves the registry behind reality, never corrupt.

use crier_core::{
    CanonicalUrl, PlatformName, PublicationRecord, PublishOutcome, Registry, StateStore,
};

use crate::audit::{AuditItem, AuditStatus};
use crate::content::{Article, ContentLoader};
use crate::error::SyncError;
use crate::outcome::{BatchReport, ItemResult, ItemStatus};
use crate::platform::{DeleteOutcome, Platform, PlatformSet};

pub(crate) const NOT_CONFIGURED: &str = "platform not configured";

// ---------------------------------------------------------------------------
// publish_items
// ---------------------------------------------------------------------------

/// Act on audit items: publish missing pairs, update changed ones.
///
/// Up-to-date items are skipped. With `dry_run` nothing is called or written;
/// items report `WouldPublish` / `WouldUpdate`.
pub fn publish_items<S: StateStore>(
    registry: &Registry<S>,
    platforms: &PlatformSet,
    loader: &dyn ContentLoader,
    items: &[AuditItem],
    dry_run: bool,
) -> Result<BatchReport, SyncError> {
    let mut report = BatchReport::default();
    for item in items {
        let status = publish_item(registry, platforms, loader, item, dry_run)?;
        if let ItemStatus::Failed { message } = &status {
            tracing::warn!("{} -> {}: {message}", item.path.display(), item.platform);
        }
        report.push(ItemResult {
            canonical_url: item.canonical_url.clone(),
            platform: item.platform.clone(),
            path: Some(item.path.clone()),
            status,
        });
    }
    Ok(report)
}

fn publish_item<S: StateStore>(
    registry: &Registry<S>,
    platforms: &PlatformSet,
    loader: &dyn ContentLoader,
    item: &AuditItem,
    dry_run: bool,
) -> Result<ItemStatus, SyncError> {
    if item.status == AuditStatus::UpToDate {
        return Ok(ItemStatus::skipped("up to date"));
    }
    let Some(url) = &item.canonical_url else {
        return Ok(ItemStatus::failed("no canonical_url in front matter"));
    };
    let existing_id = match item.status {
        AuditStatus::Changed => item.article_id.as_deref(),
        _ => None,
    };
    if dry_run {
        return Ok(match existing_id {
            Some(_) => ItemStatus::WouldUpdate,
            None => ItemStatus::WouldPublish,
        });
    }

    let context = PublicationRecord {
        title: Some(item.title.clone()),
        source_file: Some(item.path.clone()),
        content_hash: Some(item.content_hash.clone()),
        ..PublicationRecord::default()
    };
    let Some(platform) = platforms.get(&item.platform) else {
        registry.record_failure(
            url,
            &item.platform,
            NOT_CONFIGURED,
            context.title.as_deref(),
            context.source_file.as_deref(),
        )?;
        return Ok(ItemStatus::failed(NOT_CONFIGURED));
    };
    let article = match loader.load(&item.full_path) {
        Ok(Some(article)) => article,
        Ok(None) => return Ok(ItemStatus::failed("not an article")),
        Err(e) => return Ok(ItemStatus::failed(e.to_string())),
    };
    attempt(registry, platform, url, &item.platform, &article, existing_id, context)
}

/// Call `publish` or `update` and record the outcome.
pub(crate) fn attempt<S: StateStore>(
    registry: &Registry<S>,
    platform: &dyn Platform,
    url: &CanonicalUrl,
    platform_name: &PlatformName,
    article: &Article,
    existing_id: Option<&str>,
    context: PublicationRecord,
) -> Result<ItemStatus, SyncError> {
    let outcome = match existing_id {
        Some(id) => {
            tracing::info!("updating {url} on {platform_name} ({id})");
            platform.update(id, article)
        }
        None => {
            tracing::info!("publishing {url} to {platform_name}");
            platform.publish(article)
        }
    };
    registry.apply_outcome(url, platform_name, &outcome, context)?;
    Ok(status_for(outcome, existing_id.is_some()))
}

fn status_for(outcome: PublishOutcome, updated: bool) -> ItemStatus {
    let (article_id, url) = match outcome {
        PublishOutcome::Success { article_id, url } => (article_id, url),
        PublishOutcome::Thread {
            root_id, root_url, ..
        } => (root_id, root_url),
        PublishOutcome::Failure { message } => return ItemStatus::Failed { message },
    };
    if updated {
        ItemStatus::Updated { article_id, url }
    } else {
        ItemStatus::Published { article_id, url }
    }
}

// ---------------------------------------------------------------------------
// delete_publication
// ---------------------------------------------------------------------------

/// Delete the post for `url` on `platform_name`, then soft-delete the record.
///
/// The registry keeps the id and URL as history; a failed call is recorded as
/// a delete failure, which `retry` leaves alone.
pub fn delete_publication<S: StateStore>(
    registry: &Registry<S>,
    platforms: &PlatformSet,
    url: &CanonicalUrl,
    platform_name: &PlatformName,
) -> Result<ItemResult, SyncError> {
    let article = registry.get_article(url)?;
    let result = |status| ItemResult {
        canonical_url: Some(url.clone()),
        platform: platform_name.clone(),
        path: article.as_ref().and_then(|a| a.source_file.clone()),
        status,
    };

    let publication = article
        .as_ref()
        .and_then(|a| a.platforms.get(platform_name));
    let Some(article_id) = publication.and_then(|p| p.article_id.clone()) else {
        return Ok(result(ItemStatus::failed(format!(
            "{url} is not published on {platform_name}"
        ))));
    };
    if publication.is_some_and(|p| p.is_deleted()) {
        return Ok(result(ItemStatus::skipped("already deleted")));
    }
    let Some(platform) = platforms.get(platform_name) else {
        return Ok(result(ItemStatus::failed(NOT_CONFIGURED)));
    };

    tracing::info!("deleting {url} from {platform_name} ({article_id})");
    let status = match platform.delete(&article_id) {
        DeleteOutcome::Deleted => {
            registry.record_deletion(url, platform_name)?;
            ItemStatus::Deleted
        }
        DeleteOutcome::Unsupported => {
            ItemStatus::failed(format!("{platform_name} does not support deletion"))
        }
        DeleteOutcome::Failed { message } => {
            registry.record_delete_failure(url, platform_name, &message)?;
            ItemStatus::Failed { message }
        }
    };
    Ok(result(status))
}
