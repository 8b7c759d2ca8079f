//! Reconciliation: classify every (content file, platform) pair.
//!
//! Classification precedence for one pair:
//! 1. excluded (article archived and archived articles not requested)
//! 2. `UpToDate` (live publication whose stored hash equals the file hash)
//! 3. `Changed` (live publication, hash differs or was never stored)
//! 4. `Missing` (no success on record, only a failure, or soft-deleted)
//!
//! [`reconcile`] reads a registry snapshot and never writes anything.

use std::path::PathBuf;

use serde::Serialize;

use crier_core::{ArticleRecord, CanonicalUrl, ContentHash, PlatformName, RegistryState};

use crate::content::ContentFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditOptions {
    /// Report changed pairs instead of only counting them.
    pub include_changed: bool,
    /// Classify archived articles like any other.
    pub include_archived: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Missing,
    Changed,
    UpToDate,
}

/// One classified (file, platform) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditItem {
    pub path: PathBuf,
    #[serde(skip)]
    pub full_path: PathBuf,
    /// From the file, or from the registry record matched by `source_file`.
    pub canonical_url: Option<CanonicalUrl>,
    pub title: String,
    pub platform: PlatformName,
    pub status: AuditStatus,
    /// Id of the existing publication, when there is one.
    pub article_id: Option<String>,
    pub content_hash: ContentHash,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub missing: Vec<AuditItem>,
    pub changed: Vec<AuditItem>,
    pub up_to_date: Vec<AuditItem>,
    /// Archived files left out of the scan.
    pub archived_skipped: usize,
    /// Changed pairs left out because changed items were not requested.
    pub changed_skipped: usize,
}

impl AuditReport {
    /// Items a publish run would act on: missing first, then changed.
    pub fn actionable(&self) -> Vec<AuditItem> {
        self.missing.iter().chain(&self.changed).cloned().collect()
    }

    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.changed.is_empty()
    }
}

/// Classify `files × platforms` against `state`.
///
/// Output lists keep the caller's file order, then the caller's platform order.
pub fn reconcile(
    state: &RegistryState,
    files: &[ContentFile],
    platforms: &[PlatformName],
    options: AuditOptions,
) -> AuditReport {
    let mut report = AuditReport::default();

    for file in files {
        let record = resolve(state, file);
        let archived = record.is_some_and(|(_, article)| article.archived);
        if archived && !options.include_archived {
            tracing::debug!("archived, skipping: {}", file.path.display());
            report.archived_skipped += 1;
            continue;
        }
        let canonical_url = file
            .canonical_url
            .clone()
            .or_else(|| record.map(|(url, _)| url.clone()));

        for platform in platforms {
            let publication = record.and_then(|(_, article)| article.platforms.get(platform));
            let status = match publication {
                Some(p) if p.is_current(&file.content_hash) => AuditStatus::UpToDate,
                Some(p) if p.is_live() => AuditStatus::Changed,
                _ => AuditStatus::Missing,
            };
            let item = AuditItem {
                path: file.path.clone(),
                full_path: file.full_path.clone(),
                canonical_url: canonical_url.clone(),
                title: file.title.clone(),
                platform: platform.clone(),
                status,
                article_id: publication
                    .filter(|p| p.is_live())
                    .and_then(|p| p.article_id.clone()),
                content_hash: file.content_hash.clone(),
            };
            match status {
                AuditStatus::UpToDate => report.up_to_date.push(item),
                AuditStatus::Missing => report.missing.push(item),
                AuditStatus::Changed if options.include_changed => report.changed.push(item),
                AuditStatus::Changed => report.changed_skipped += 1,
            }
        }
    }
    report
}

/// The registry record for `file`: by canonical URL, else by recorded source path.
fn resolve<'a>(
    state: &'a RegistryState,
    file: &ContentFile,
) -> Option<(&'a CanonicalUrl, &'a ArticleRecord)> {
    file.canonical_url
        .as_ref()
        .and_then(|url| state.articles.get_key_value(url))
        .or_else(|| state.find_by_file(&file.path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crier_core::{hash, MemoryStore, PublicationRecord, Registry};

    fn file(name: &str, body: &str) -> ContentFile {
        ContentFile {
            path: PathBuf::from(format!("posts/{name}.md")),
            full_path: PathBuf::from(format!("/blog/posts/{name}.md")),
            canonical_url: Some(CanonicalUrl::from(format!("https://x/{name}"))),
            title: name.to_uppercase(),
            content_hash: hash(body),
        }
    }

    fn devto() -> PlatformName {
        PlatformName::from("devto")
    }

    fn publish(reg: &Registry<MemoryStore>, file: &ContentFile, platform: &PlatformName) {
        let url = file.canonical_url.clone().unwrap();
        reg.record_publication(
            &url,
            platform,
            PublicationRecord::new("1", "https://dev.to/1")
                .source_file(&file.path)
                .content_hash(file.content_hash.clone()),
        )
        .unwrap();
    }

    fn paths(items: &[AuditItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| format!("{}@{}", i.path.display(), i.platform))
            .collect()
    }

    const ALL: AuditOptions = AuditOptions {
        include_changed: true,
        include_archived: false,
    };

    #[test]
    fn scenario_b_missing_only_unpublished() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "A body");
        let b = file("b", "B body");
        publish(&reg, &a, &devto());

        let report = reconcile(&reg.snapshot().unwrap(), &[a, b], &[devto()], ALL);
        assert_eq!(paths(&report.missing), vec!["posts/b.md@devto"]);
        assert!(report.changed.is_empty());
        assert_eq!(paths(&report.up_to_date), vec!["posts/a.md@devto"]);
    }

    #[test]
    fn scenario_c_edit_makes_changed() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        publish(&reg, &a, &devto());

        let edited = ContentFile {
            content_hash: hash("v2"),
            ..a
        };
        let report = reconcile(&reg.snapshot().unwrap(), &[edited], &[devto()], ALL);
        assert_eq!(paths(&report.changed), vec!["posts/a.md@devto"]);
        assert_eq!(report.changed[0].article_id.as_deref(), Some("1"));
        assert!(report.missing.is_empty());
        assert!(report.up_to_date.is_empty());
    }

    #[test]
    fn changed_counted_but_hidden_when_not_requested() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        publish(&reg, &a, &devto());
        let edited = ContentFile {
            content_hash: hash("v2"),
            ..a
        };

        let report = reconcile(
            &reg.snapshot().unwrap(),
            &[edited],
            &[devto()],
            AuditOptions::default(),
        );
        assert!(report.changed.is_empty());
        assert!(report.missing.is_empty());
        assert!(report.up_to_date.is_empty());
        assert_eq!(report.changed_skipped, 1);
    }

    #[test]
    fn scenario_d_archive_excludes_everywhere() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        publish(&reg, &a, &devto());
        reg.set_archived(a.canonical_url.as_ref().unwrap(), true).unwrap();
        let edited = ContentFile {
            content_hash: hash("v2"),
            ..a
        };
        let bluesky = PlatformName::from("bluesky");
        let platforms = [devto(), bluesky];
        let state = reg.snapshot().unwrap();

        let hidden = reconcile(&state, std::slice::from_ref(&edited), &platforms, ALL);
        assert!(hidden.missing.is_empty());
        assert!(hidden.changed.is_empty());
        assert!(hidden.up_to_date.is_empty());
        assert_eq!(hidden.archived_skipped, 1);

        let shown = reconcile(
            &state,
            &[edited],
            &platforms,
            AuditOptions {
                include_changed: true,
                include_archived: true,
            },
        );
        assert_eq!(paths(&shown.changed), vec!["posts/a.md@devto"]);
        assert_eq!(paths(&shown.missing), vec!["posts/a.md@bluesky"]);
        assert_eq!(shown.archived_skipped, 0);
    }

    #[test]
    fn soft_deleted_and_failure_only_are_missing() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        let url = a.canonical_url.clone().unwrap();
        let bluesky = PlatformName::from("bluesky");
        publish(&reg, &a, &devto());
        reg.record_deletion(&url, &devto()).unwrap();
        reg.record_failure(&url, &bluesky, "Auth failed", None, None).unwrap();

        let report = reconcile(&reg.snapshot().unwrap(), &[a], &[devto(), bluesky], ALL);
        assert_eq!(
            paths(&report.missing),
            vec!["posts/a.md@devto", "posts/a.md@bluesky"]
        );
        assert!(report.missing.iter().all(|i| i.article_id.is_none()));
    }

    #[test]
    fn missing_stored_hash_is_changed() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        reg.record_publication(
            a.canonical_url.as_ref().unwrap(),
            &devto(),
            PublicationRecord::new("7", "u"),
        )
        .unwrap();

        let report = reconcile(&reg.snapshot().unwrap(), &[a], &[devto()], ALL);
        assert_eq!(paths(&report.changed), vec!["posts/a.md@devto"]);
    }

    #[test]
    fn resolves_by_source_file_without_canonical_url() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        publish(&reg, &a, &devto());
        let no_url = ContentFile {
            canonical_url: None,
            ..a
        };

        let report = reconcile(&reg.snapshot().unwrap(), &[no_url], &[devto()], ALL);
        assert_eq!(report.up_to_date.len(), 1);
        assert_eq!(
            report.up_to_date[0].canonical_url,
            Some(CanonicalUrl::from("https://x/a"))
        );
    }

    #[test]
    fn output_follows_caller_order() {
        let reg = Registry::new(MemoryStore::new());
        let files = [file("z", "z"), file("a", "a"), file("m", "m")];
        let platforms = [PlatformName::from("mastodon"), devto()];

        let report = reconcile(&reg.snapshot().unwrap(), &files, &platforms, ALL);
        assert_eq!(
            paths(&report.missing),
            vec![
                "posts/z.md@mastodon",
                "posts/z.md@devto",
                "posts/a.md@mastodon",
                "posts/a.md@devto",
                "posts/m.md@mastodon",
                "posts/m.md@devto",
            ]
        );
    }

    #[test]
    fn reconcile_is_read_only() {
        let reg = Registry::new(MemoryStore::new());
        let a = file("a", "v1");
        publish(&reg, &a, &devto());
        let before = reg.snapshot().unwrap();
        let _ = reconcile(&before, &[a], &[devto(), PlatformName::from("x")], ALL);
        assert_eq!(reg.snapshot().unwrap(), before);
    }
}
