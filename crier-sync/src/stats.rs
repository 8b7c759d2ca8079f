//! Stats refresh: pull engagement counters for live publications.

use chrono::{Duration, Utc};

use crier_core::{Registry, StateStore};

use crate::error::SyncError;
use crate::outcome::{BatchReport, ItemResult, ItemStatus};
use crate::platform::PlatformSet;

/// Refresh cached stats older than `max_age` (or never fetched).
///
/// Deleted publications and platforms that are not configured are left out.
/// A platform that reports no stats is recorded as skipped.
pub fn refresh_stats<S: StateStore>(
    registry: &Registry<S>,
    platforms: &PlatformSet,
    max_age: Duration,
) -> Result<BatchReport, SyncError> {
    let state = registry.snapshot()?;
    let now = Utc::now();
    let mut report = BatchReport::default();

    for (url, article) in &state.articles {
        for (platform_name, publication) in &article.platforms {
            if !publication.is_live() {
                continue;
            }
            let Some(article_id) = publication.article_id.as_deref() else {
                continue;
            };
            let Some(platform) = platforms.get(platform_name) else {
                tracing::debug!("{platform_name} not configured, skipping stats for {url}");
                continue;
            };
            let fresh = publication
                .stats
                .as_ref()
                .is_some_and(|s| now - s.fetched_at < max_age);

            let status = if fresh {
                ItemStatus::skipped("cached stats are fresh")
            } else {
                match platform.get_stats(article_id) {
                    Some(counts) => {
                        registry.save_stats(url, platform_name, counts)?;
                        tracing::info!("refreshed {platform_name} stats for {url}");
                        ItemStatus::StatsRefreshed
                    }
                    None => ItemStatus::skipped("no stats reported"),
                }
            };
            report.push(ItemResult {
                canonical_url: Some(url.clone()),
                platform: platform_name.clone(),
                path: article.source_file.clone(),
                status,
            });
        }
    }
    Ok(report)
}
