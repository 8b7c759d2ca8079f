//! Publication registry: mutations and queries over a [`StateStore`].
//!
//! # API pattern
//!
//! A [`Registry`] is an explicit handle constructed once per invocation and
//! passed to whatever needs it. Every mutating method is one full
//! read-modify-write cycle through [`StateStore::transact`]; every query loads
//! a fresh snapshot.
//!
//! Absence is not an error: mutations that need an existing record return
//! `false`, queries return `None`. `Err` means the store itself is unusable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::RegistryError;
use crate::hash::ContentHash;
use crate::store::{FileStore, StateStore, Txn};
use crate::types::{
    ArticleRecord, CanonicalUrl, FailedOperation, PlatformName, PlatformPublication,
    PublicationError, PublishOutcome, RegistryState, StatCounts, Stats,
};

// ---------------------------------------------------------------------------
// 1. Inputs and query rows
// ---------------------------------------------------------------------------

/// Arguments of a successful publish, as passed to [`Registry::record_publication`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationRecord {
    pub article_id: Option<String>,
    pub post_url: Option<String>,
    pub title: Option<String>,
    pub source_file: Option<PathBuf>,
    /// Hash of exactly the content sent to the platform.
    pub content_hash: Option<ContentHash>,
    pub rewritten: bool,
    pub rewrite_author: Option<String>,
    pub posted_content: Option<String>,
}

impl PublicationRecord {
    pub fn new(article_id: impl Into<String>, post_url: impl Into<String>) -> Self {
        Self {
            article_id: Some(article_id.into()),
            post_url: Some(post_url.into()),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    pub fn content_hash(mut self, hash: ContentHash) -> Self {
        self.content_hash = Some(hash);
        self
    }

    pub fn rewrite(mut self, author: Option<String>, posted_content: Option<String>) -> Self {
        self.rewritten = true;
        self.rewrite_author = author;
        self.posted_content = posted_content;
        self
    }
}

/// One publication on a given platform, as returned by
/// [`Registry::get_platform_publications`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformEntry {
    pub canonical_url: CanonicalUrl,
    pub title: Option<String>,
    pub source_file: Option<PathBuf>,
    pub publication: PlatformPublication,
}

/// A platform sub-record whose most recent attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub canonical_url: CanonicalUrl,
    pub platform: PlatformName,
    pub title: Option<String>,
    pub source_file: Option<PathBuf>,
    pub message: String,
    pub failed_at: DateTime<Utc>,
    pub operation: FailedOperation,
    /// Id of an earlier successful publish, if any.
    pub article_id: Option<String>,
}

// ---------------------------------------------------------------------------
// 2. Snapshot queries (pure, shared by the handle and by read-only callers)
// ---------------------------------------------------------------------------

impl RegistryState {
    pub fn article(&self, url: &CanonicalUrl) -> Option<&ArticleRecord> {
        self.articles.get(url)
    }

    pub fn publication(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Option<&PlatformPublication> {
        self.articles.get(url)?.platforms.get(platform)
    }

    /// Find the article whose recorded `source_file` equals `path`.
    pub fn find_by_file(&self, path: &Path) -> Option<(&CanonicalUrl, &ArticleRecord)> {
        self.articles
            .iter()
            .find(|(_, article)| article.source_file.as_deref() == Some(path))
    }

    /// Every sub-record carrying a `last_error`, ordered by URL then platform.
    pub fn failures(&self) -> Vec<FailureEntry> {
        let mut out = Vec::new();
        for (url, article) in &self.articles {
            for (platform, publication) in &article.platforms {
                let Some(error) = publication.last_error.as_ref() else {
                    continue;
                };
                out.push(FailureEntry {
                    canonical_url: url.clone(),
                    platform: platform.clone(),
                    title: article.title.clone(),
                    source_file: article.source_file.clone(),
                    message: error.message.clone(),
                    failed_at: error.failed_at,
                    operation: error.operation,
                    article_id: publication.article_id.clone(),
                });
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// 3. Registry handle
// ---------------------------------------------------------------------------

/// Explicit handle over one registry store.
#[derive(Debug)]
pub struct Registry<S: StateStore = FileStore> {
    store: S,
}

impl Registry<FileStore> {
    /// Registry found by walking up from `start`.
    pub fn discover(start: &Path) -> Self {
        Self::new(FileStore::discover(start))
    }
}

impl<S: StateStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A full copy of the current state, for read-only classification.
    pub fn snapshot(&self) -> Result<RegistryState, RegistryError> {
        self.store.load()
    }

    // -- mutations ----------------------------------------------------------

    /// Record a successful publish or update.
    ///
    /// Creates the article if needed, upserts the platform sub-record, sets
    /// `published_at` on the first success only and `updated_at` on every
    /// call, and clears `deleted_at` / `last_error` for that platform.
    pub fn record_publication(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
        record: PublicationRecord,
    ) -> Result<(), RegistryError> {
        let now = Utc::now();
        self.store.transact(|state| {
            let publication = upsert_success(state, url, platform, &record, now);
            publication.is_thread = false;
            publication.thread_ids.clear();
            publication.thread_urls.clear();
            Txn::Commit(())
        })?;
        tracing::info!("recorded {platform} publication for {url}");
        Ok(())
    }

    /// Record a thread publication: same upsert as
    /// [`record_publication`](Self::record_publication), with the root post's
    /// id and URL standing for the whole thread.
    pub fn record_thread_publication(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
        root: PublicationRecord,
        thread_ids: Vec<String>,
        thread_urls: Vec<String>,
    ) -> Result<(), RegistryError> {
        let now = Utc::now();
        let count = thread_ids.len();
        self.store.transact(|state| {
            let publication = upsert_success(state, url, platform, &root, now);
            publication.is_thread = true;
            publication.thread_ids = thread_ids;
            publication.thread_urls = thread_urls;
            Txn::Commit(())
        })?;
        tracing::info!("recorded {count}-post {platform} thread for {url}");
        Ok(())
    }

    /// Record a failed attempt. Earlier success data on the platform is kept.
    pub fn record_failure(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
        message: &str,
        title: Option<&str>,
        source_file: Option<&Path>,
    ) -> Result<(), RegistryError> {
        let now = Utc::now();
        self.store.transact(|state| {
            let article = state.articles.entry(url.clone()).or_default();
            if let Some(title) = title {
                article.title = Some(title.to_string());
            }
            if let Some(path) = source_file {
                article.source_file = Some(path.to_path_buf());
            }
            let publication = article.platforms.entry(platform.clone()).or_default();
            publication.last_error = Some(PublicationError {
                message: message.to_string(),
                failed_at: now,
                operation: FailedOperation::Publish,
            });
            Txn::Commit(())
        })?;
        tracing::warn!("recorded {platform} failure for {url}: {message}");
        Ok(())
    }

    /// Record a failed delete on an existing publication. The post is still
    /// live, so nothing but the error changes. Returns `false` when there is
    /// no such publication.
    pub fn record_delete_failure(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
        message: &str,
    ) -> Result<bool, RegistryError> {
        let now = Utc::now();
        let recorded = self.store.transact(|state| {
            match state
                .articles
                .get_mut(url)
                .and_then(|a| a.platforms.get_mut(platform))
            {
                Some(publication) => {
                    publication.last_error = Some(PublicationError {
                        message: message.to_string(),
                        failed_at: now,
                        operation: FailedOperation::Delete,
                    });
                    Txn::Commit(true)
                }
                None => Txn::Abort(false),
            }
        })?;
        if recorded {
            tracing::warn!("recorded {platform} delete failure for {url}: {message}");
        }
        Ok(recorded)
    }

    /// Drop the recorded error on a publication. Returns whether one was set.
    pub fn clear_failure(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<bool, RegistryError> {
        self.store.transact(|state| {
            match state
                .articles
                .get_mut(url)
                .and_then(|a| a.platforms.get_mut(platform))
            {
                Some(publication) if publication.last_error.is_some() => {
                    publication.last_error = None;
                    Txn::Commit(true)
                }
                _ => Txn::Abort(false),
            }
        })
    }

    /// Fold a platform call outcome into the registry.
    ///
    /// `context` supplies the article metadata and the hash of what was sent;
    /// its id/url fields are ignored in favour of the outcome's. Returns
    /// whether the outcome was a success.
    pub fn apply_outcome(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
        outcome: &PublishOutcome,
        context: PublicationRecord,
    ) -> Result<bool, RegistryError> {
        match outcome {
            PublishOutcome::Success { article_id, url: post_url } => {
                let record = PublicationRecord {
                    article_id: Some(article_id.clone()),
                    post_url: post_url.clone(),
                    ..context
                };
                self.record_publication(url, platform, record)?;
                Ok(true)
            }
            PublishOutcome::Thread {
                root_id,
                root_url,
                ids,
                urls,
            } => {
                let root = PublicationRecord {
                    article_id: Some(root_id.clone()),
                    post_url: root_url.clone(),
                    ..context
                };
                self.record_thread_publication(url, platform, root, ids.clone(), urls.clone())?;
                Ok(true)
            }
            PublishOutcome::Failure { message } => {
                self.record_failure(
                    url,
                    platform,
                    message,
                    context.title.as_deref(),
                    context.source_file.as_deref(),
                )?;
                Ok(false)
            }
        }
    }

    /// Soft-delete: stamp `deleted_at`, keep the id/url as history.
    pub fn record_deletion(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<bool, RegistryError> {
        let now = Utc::now();
        self.store.transact(|state| {
            match state
                .articles
                .get_mut(url)
                .and_then(|a| a.platforms.get_mut(platform))
            {
                Some(publication) => {
                    publication.deleted_at = Some(now);
                    publication.last_error = None;
                    Txn::Commit(true)
                }
                None => Txn::Abort(false),
            }
        })
    }

    /// Physically remove one platform sub-record.
    pub fn remove_publication(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<bool, RegistryError> {
        self.store.transact(|state| {
            let removed = state
                .articles
                .get_mut(url)
                .and_then(|a| a.platforms.remove(platform))
                .is_some();
            if removed {
                Txn::Commit(true)
            } else {
                Txn::Abort(false)
            }
        })
    }

    /// Physically remove an article and all of its sub-records.
    pub fn remove_article(&self, url: &CanonicalUrl) -> Result<bool, RegistryError> {
        self.store.transact(|state| {
            if state.articles.remove(url).is_some() {
                Txn::Commit(true)
            } else {
                Txn::Abort(false)
            }
        })
    }

    /// Set or clear the archived flag. Only existing articles can be archived.
    pub fn set_archived(&self, url: &CanonicalUrl, archived: bool) -> Result<bool, RegistryError> {
        let now = Utc::now();
        self.store.transact(|state| match state.articles.get_mut(url) {
            Some(article) => {
                article.archived = archived;
                article.archived_at = archived.then_some(now);
                Txn::Commit(true)
            }
            None => Txn::Abort(false),
        })
    }

    /// Replace the cached stats for an existing publication. A sub-record
    /// holding only a failure has nothing to report stats for.
    pub fn save_stats(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
        counts: StatCounts,
    ) -> Result<bool, RegistryError> {
        let now = Utc::now();
        self.store.transact(|state| {
            match state
                .articles
                .get_mut(url)
                .and_then(|a| a.platforms.get_mut(platform))
            {
                Some(publication) if publication.is_published() => {
                    publication.stats = Some(Stats::from_counts(counts, now));
                    Txn::Commit(true)
                }
                _ => Txn::Abort(false),
            }
        })
    }

    // -- queries ------------------------------------------------------------

    pub fn get_article(&self, url: &CanonicalUrl) -> Result<Option<ArticleRecord>, RegistryError> {
        Ok(self.store.load()?.articles.remove(url))
    }

    pub fn get_article_by_file(
        &self,
        path: &Path,
    ) -> Result<Option<(CanonicalUrl, ArticleRecord)>, RegistryError> {
        let state = self.store.load()?;
        Ok(state
            .find_by_file(path)
            .map(|(url, article)| (url.clone(), article.clone())))
    }

    pub fn get_all_articles(&self) -> Result<BTreeMap<CanonicalUrl, ArticleRecord>, RegistryError> {
        Ok(self.store.load()?.articles)
    }

    pub fn get_platform_publications(
        &self,
        platform: &PlatformName,
    ) -> Result<Vec<PlatformEntry>, RegistryError> {
        let state = self.store.load()?;
        Ok(state
            .articles
            .into_iter()
            .filter_map(|(url, mut article)| {
                let publication = article.platforms.remove(platform)?;
                Some(PlatformEntry {
                    canonical_url: url,
                    title: article.title,
                    source_file: article.source_file,
                    publication,
                })
            })
            .collect())
    }

    pub fn get_publication_info(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<Option<PlatformPublication>, RegistryError> {
        let state = self.store.load()?;
        Ok(state.publication(url, platform).cloned())
    }

    pub fn get_publication_id(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<Option<String>, RegistryError> {
        Ok(self
            .get_publication_info(url, platform)?
            .and_then(|p| p.article_id))
    }

    /// Whether a success has ever been recorded for this platform.
    /// Soft-deleted publications still count; see [`is_deleted`](Self::is_deleted).
    pub fn is_published(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<bool, RegistryError> {
        Ok(self
            .get_publication_info(url, platform)?
            .is_some_and(|p| p.is_published()))
    }

    /// Whether `current` differs from the recorded hash.
    ///
    /// With a platform, compares against what was sent there; without one,
    /// against the article-level hash. Unknown articles, unknown platforms,
    /// and records with no stored hash all count as changed.
    pub fn has_content_changed(
        &self,
        url: &CanonicalUrl,
        current: &ContentHash,
        platform: Option<&PlatformName>,
    ) -> Result<bool, RegistryError> {
        let state = self.store.load()?;
        let Some(article) = state.article(url) else {
            return Ok(true);
        };
        let stored = match platform {
            Some(platform) => match article.platforms.get(platform) {
                Some(publication) => publication.content_hash.as_ref(),
                None => return Ok(true),
            },
            None => article.content_hash.as_ref(),
        };
        Ok(stored != Some(current))
    }

    pub fn is_deleted(&self, url: &CanonicalUrl, platform: &PlatformName) -> Result<bool, RegistryError> {
        Ok(self
            .get_publication_info(url, platform)?
            .is_some_and(|p| p.is_deleted()))
    }

    pub fn is_archived(&self, url: &CanonicalUrl) -> Result<bool, RegistryError> {
        Ok(self.get_article(url)?.is_some_and(|a| a.archived))
    }

    pub fn is_thread(&self, url: &CanonicalUrl, platform: &PlatformName) -> Result<bool, RegistryError> {
        Ok(self
            .get_publication_info(url, platform)?
            .is_some_and(|p| p.is_thread))
    }

    /// Ordered post ids of a thread publication; `None` when not a thread.
    pub fn get_thread_ids(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<Option<Vec<String>>, RegistryError> {
        Ok(self
            .get_publication_info(url, platform)?
            .filter(|p| p.is_thread)
            .map(|p| p.thread_ids))
    }

    pub fn get_cached_stats(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<Option<Stats>, RegistryError> {
        Ok(self
            .get_publication_info(url, platform)?
            .and_then(|p| p.stats))
    }

    /// Seconds since the cached stats were fetched; `None` when nothing is cached.
    pub fn get_stats_age_seconds(
        &self,
        url: &CanonicalUrl,
        platform: &PlatformName,
    ) -> Result<Option<i64>, RegistryError> {
        Ok(self
            .get_cached_stats(url, platform)?
            .map(|s| (Utc::now() - s.fetched_at).num_seconds().max(0)))
    }

    pub fn get_failures(&self) -> Result<Vec<FailureEntry>, RegistryError> {
        Ok(self.store.load()?.failures())
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn upsert_success<'a>(
    state: &'a mut RegistryState,
    url: &CanonicalUrl,
    platform: &PlatformName,
    record: &PublicationRecord,
    now: DateTime<Utc>,
) -> &'a mut PlatformPublication {
    let article = state.articles.entry(url.clone()).or_default();
    if let Some(title) = &record.title {
        article.title = Some(title.clone());
    }
    if let Some(path) = &record.source_file {
        article.source_file = Some(path.clone());
    }
    // A rewrite's hash describes the rewritten text, not the source file.
    if !record.rewritten {
        if let Some(hash) = &record.content_hash {
            article.content_hash = Some(hash.clone());
        }
    }

    let publication = article.platforms.entry(platform.clone()).or_default();
    if publication.published_at.is_none() {
        publication.published_at = Some(now);
    }
    publication.updated_at = Some(now);
    publication.article_id = record.article_id.clone();
    publication.url = record.post_url.clone();
    publication.content_hash = record.content_hash.clone();
    publication.rewritten = record.rewritten;
    publication.rewrite_author = record.rewrite_author.clone();
    publication.posted_content = record.posted_content.clone();
    publication.deleted_at = None;
    publication.last_error = None;
    publication
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;
    use crate::store::MemoryStore;

    fn registry() -> Registry<MemoryStore> {
        Registry::new(MemoryStore::new())
    }

    fn url() -> CanonicalUrl {
        CanonicalUrl::from("https://example.com/article")
    }

    fn devto() -> PlatformName {
        PlatformName::from("devto")
    }

    #[test]
    fn first_publication_creates_article() {
        let reg = registry();
        reg.record_publication(
            &url(),
            &devto(),
            PublicationRecord::new("1", "https://dev.to/a").title("Hello"),
        )
        .unwrap();

        let article = reg.get_article(&url()).unwrap().expect("article");
        assert_eq!(article.title.as_deref(), Some("Hello"));
        let publication = &article.platforms[&devto()];
        assert_eq!(publication.article_id.as_deref(), Some("1"));
        assert_eq!(publication.url.as_deref(), Some("https://dev.to/a"));
        assert_eq!(publication.published_at, publication.updated_at);
    }

    #[test]
    fn republish_keeps_published_at_and_advances_updated_at() {
        let reg = registry();
        reg.record_publication(&url(), &devto(), PublicationRecord::new("1", "u")).unwrap();
        let first = reg.get_publication_info(&url(), &devto()).unwrap().unwrap();
        reg.record_publication(&url(), &devto(), PublicationRecord::new("2", "u2")).unwrap();
        let second = reg.get_publication_info(&url(), &devto()).unwrap().unwrap();

        assert_eq!(first.published_at, second.published_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.article_id.as_deref(), Some("2"));
    }

    #[test]
    fn rewrite_hash_stays_on_platform_only() {
        let reg = registry();
        let source = hash("source");
        let rewritten = hash("short version");
        reg.record_publication(
            &url(),
            &devto(),
            PublicationRecord::new("1", "u").content_hash(source.clone()),
        )
        .unwrap();
        reg.record_publication(
            &url(),
            &PlatformName::from("bluesky"),
            PublicationRecord::new("at://1", "u")
                .content_hash(rewritten.clone())
                .rewrite(Some("claude-code".into()), Some("short version".into())),
        )
        .unwrap();

        let article = reg.get_article(&url()).unwrap().unwrap();
        assert_eq!(article.content_hash, Some(source));
        let bluesky = &article.platforms[&PlatformName::from("bluesky")];
        assert!(bluesky.rewritten);
        assert_eq!(bluesky.content_hash, Some(rewritten));
        assert_eq!(bluesky.rewrite_author.as_deref(), Some("claude-code"));
    }

    #[test]
    fn failure_creates_empty_sub_record() {
        let reg = registry();
        reg.record_failure(&url(), &devto(), "API returned 500", Some("T"), None)
            .unwrap();
        let publication = reg.get_publication_info(&url(), &devto()).unwrap().unwrap();
        assert_eq!(publication.last_error.unwrap().message, "API returned 500");
        assert!(publication.article_id.is_none());
        assert!(!reg.is_published(&url(), &devto()).unwrap());
    }

    #[test]
    fn apply_outcome_routes_variants() {
        let reg = registry();
        let ok = reg
            .apply_outcome(
                &url(),
                &devto(),
                &PublishOutcome::Success {
                    article_id: "9".into(),
                    url: Some("https://dev.to/9".into()),
                },
                PublicationRecord::default().content_hash(hash("x")),
            )
            .unwrap();
        assert!(ok);
        assert_eq!(reg.get_publication_id(&url(), &devto()).unwrap().as_deref(), Some("9"));

        let bluesky = PlatformName::from("bluesky");
        let ok = reg
            .apply_outcome(
                &url(),
                &bluesky,
                &PublishOutcome::Thread {
                    root_id: "r".into(),
                    root_url: Some("https://bsky.app/r".into()),
                    ids: vec!["r".into(), "c1".into()],
                    urls: vec![],
                },
                PublicationRecord::default(),
            )
            .unwrap();
        assert!(ok);
        assert!(reg.is_thread(&url(), &bluesky).unwrap());
        assert_eq!(
            reg.get_thread_ids(&url(), &bluesky).unwrap(),
            Some(vec!["r".to_string(), "c1".to_string()])
        );

        let ok = reg
            .apply_outcome(&url(), &devto(), &PublishOutcome::failure("boom"), PublicationRecord::default())
            .unwrap();
        assert!(!ok);
        let publication = reg.get_publication_info(&url(), &devto()).unwrap().unwrap();
        assert_eq!(publication.article_id.as_deref(), Some("9"));
        assert_eq!(publication.last_error.unwrap().message, "boom");
    }

    #[test]
    fn plain_publish_replaces_thread() {
        let reg = registry();
        reg.record_thread_publication(
            &url(),
            &devto(),
            PublicationRecord::new("r", "u"),
            vec!["r".into(), "c".into()],
            vec!["u".into(), "uc".into()],
        )
        .unwrap();
        reg.record_publication(&url(), &devto(), PublicationRecord::new("p", "u")).unwrap();
        assert!(!reg.is_thread(&url(), &devto()).unwrap());
        assert_eq!(reg.get_thread_ids(&url(), &devto()).unwrap(), None);
    }

    #[test]
    fn find_by_file_matches_recorded_path() {
        let reg = registry();
        reg.record_publication(
            &url(),
            &devto(),
            PublicationRecord::new("1", "u").source_file("posts/a.md"),
        )
        .unwrap();
        let (found, _) = reg
            .get_article_by_file(Path::new("posts/a.md"))
            .unwrap()
            .expect("found");
        assert_eq!(found, url());
        assert!(reg.get_article_by_file(Path::new("posts/b.md")).unwrap().is_none());
    }

    #[test]
    fn stats_age_is_small_after_save() {
        let reg = registry();
        reg.record_publication(&url(), &devto(), PublicationRecord::new("1", "u")).unwrap();
        assert_eq!(reg.get_stats_age_seconds(&url(), &devto()).unwrap(), None);
        assert!(reg
            .save_stats(&url(), &devto(), StatCounts { views: Some(3), ..Default::default() })
            .unwrap());
        let age = reg.get_stats_age_seconds(&url(), &devto()).unwrap().unwrap();
        assert!((0..5).contains(&age));
    }
    #[test]
    fn delete_failure_keeps_post_live_until_a_delete_succeeds() {
        let reg = registry();
        assert!(!reg.record_delete_failure(&url(), &devto(), "403").unwrap());

        reg.record_publication(&url(), &devto(), PublicationRecord::new("1", "u")).unwrap();
        assert!(reg.record_delete_failure(&url(), &devto(), "403").unwrap());
        let failures = reg.get_failures().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].operation, FailedOperation::Delete);
        assert!(!reg.is_deleted(&url(), &devto()).unwrap());
        assert!(reg.is_published(&url(), &devto()).unwrap());

        assert!(reg.record_deletion(&url(), &devto()).unwrap());
        assert!(reg.get_failures().unwrap().is_empty());
    }

    #[test]
    fn clear_failure_only_reports_when_something_was_set() {
        let reg = registry();
        reg.record_publication(&url(), &devto(), PublicationRecord::new("1", "u")).unwrap();
        assert!(!reg.clear_failure(&url(), &devto()).unwrap());

        reg.record_failure(&url(), &devto(), "500", None, None).unwrap();
        assert!(reg.clear_failure(&url(), &devto()).unwrap());
        let publication = reg.get_publication_info(&url(), &devto()).unwrap().unwrap();
        assert!(publication.last_error.is_none());
        assert_eq!(publication.article_id.as_deref(), Some("1"));
    }
}
