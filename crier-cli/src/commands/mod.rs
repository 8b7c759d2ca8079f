//! Subcommand implementations and the per-invocation workspace they share.

pub mod archive;
pub mod audit;
pub mod delete;
pub mod failures;
pub mod forget;
pub mod publish;
pub mod stats;
pub mod status;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crier_core::{CanonicalUrl, FileStore, Registry, StateStore};
use crier_sync::{
    content::relative_to, BatchReport, ContentFile, ContentLoader, FrontMatterLoader, ItemStatus,
};

use crate::config::Config;

/// Everything one invocation works against: the registry found from the
/// current directory, the project root it belongs to, and the configuration.
pub struct Workspace {
    pub registry: Registry,
    pub root: PathBuf,
    pub config: Config,
}

impl Workspace {
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("could not determine current directory")?;
        let store = FileStore::discover(&cwd);
        let registry_dir = store
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());
        let root = store
            .project_root()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());
        tracing::debug!("registry at {}", store.location());
        let config = Config::discover(config_path, &registry_dir)?;
        Ok(Self {
            registry: Registry::new(store),
            root,
            config,
        })
    }

    pub fn loader(&self) -> &'static dyn ContentLoader {
        &FrontMatterLoader
    }

    /// Load a single content file named on the command line.
    pub fn content_file(&self, path: &Path) -> Result<ContentFile> {
        ContentFile::load(self.loader(), path, &self.root)
            .with_context(|| format!("failed to read {}", path.display()))?
            .with_context(|| format!("{} has no front matter title", path.display()))
    }

    /// Resolve a FILE-or-URL argument to a canonical URL.
    ///
    /// An existing file resolves through its front matter, falling back to a
    /// registry record with that source path. Anything else is taken as a URL.
    pub fn resolve_target(&self, target: &str) -> Result<CanonicalUrl> {
        let path = Path::new(target);
        if !path.is_file() {
            return Ok(CanonicalUrl::from(target));
        }
        if let Some(url) = self
            .loader()
            .load(path)
            .with_context(|| format!("failed to read {target}"))?
            .and_then(|article| article.canonical_url)
        {
            return Ok(url);
        }
        let relative = relative_to(path, &self.root);
        self.registry
            .get_article_by_file(&relative)?
            .map(|(url, _)| url)
            .with_context(|| format!("{target} has no canonical_url and is not tracked"))
    }
}

// ---------------------------------------------------------------------------
// Batch report rendering (shared by audit, publish, delete, stats)
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "article")]
    article: String,
    #[tabled(rename = "platform")]
    platform: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "detail")]
    detail: String,
}

pub fn print_report(report: &BatchReport) {
    if report.items.is_empty() {
        println!("Nothing to do.");
        return;
    }
    let rows: Vec<ResultRow> = report
        .items
        .iter()
        .map(|item| {
            let (result, detail) = describe(&item.status);
            ResultRow {
                article: item
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .or_else(|| item.canonical_url.as_ref().map(ToString::to_string))
                    .unwrap_or_default(),
                platform: item.platform.to_string(),
                result,
                detail,
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{} succeeded, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped()
    );
}

fn describe(status: &ItemStatus) -> (String, String) {
    match status {
        ItemStatus::Published { url, .. } => (
            "published".green().to_string(),
            url.clone().unwrap_or_default(),
        ),
        ItemStatus::Updated { url, .. } => (
            "updated".green().to_string(),
            url.clone().unwrap_or_default(),
        ),
        ItemStatus::Deleted => ("deleted".green().to_string(), String::new()),
        ItemStatus::StatsRefreshed => ("refreshed".green().to_string(), String::new()),
        ItemStatus::WouldPublish => ("would publish".cyan().to_string(), String::new()),
        ItemStatus::WouldUpdate => ("would update".cyan().to_string(), String::new()),
        ItemStatus::Skipped { reason } => ("skipped".bright_black().to_string(), reason.clone()),
        ItemStatus::Failed { message } => ("failed".red().bold().to_string(), message.clone()),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON")?
    );
    Ok(())
}
