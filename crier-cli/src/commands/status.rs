//! `crier status`: what the registry knows, per article or per platform.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crier_core::{ArticleRecord, CanonicalUrl, PlatformPublication, StateStore};

use super::{print_json, Workspace};

/// Arguments for `crier status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show one article (file path or canonical URL).
    pub file: Option<String>,

    /// Include archived articles in the overview.
    #[arg(long, conflicts_with = "file")]
    pub all: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ArticleJson<'a> {
    canonical_url: &'a CanonicalUrl,
    #[serde(flatten)]
    record: &'a ArticleRecord,
}

#[derive(Tabled)]
struct PlatformRow {
    #[tabled(rename = "platform")]
    platform: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "url")]
    url: String,
    #[tabled(rename = "updated")]
    updated: String,
}

#[derive(Tabled)]
struct ArticleRow {
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "canonical url")]
    url: String,
    #[tabled(rename = "live")]
    live: usize,
    #[tabled(rename = "failed")]
    failed: usize,
    #[tabled(rename = "archived")]
    archived: String,
}

impl StatusArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        match &self.file {
            Some(target) => self.show_one(ws, target),
            None => self.show_all(ws),
        }
    }

    fn show_one(&self, ws: &Workspace, target: &str) -> Result<u8> {
        let url = ws.resolve_target(target)?;
        let Some(article) = ws.registry.get_article(&url)? else {
            eprintln!("{} is not tracked in {}", url, ws.registry.store().location());
            return Ok(1);
        };

        if self.json {
            print_json(&ArticleJson {
                canonical_url: &url,
                record: &article,
            })?;
            return Ok(0);
        }

        println!("{}", article.title.as_deref().unwrap_or(url.as_str()).bold());
        println!("{url}");
        if let Some(path) = &article.source_file {
            println!("source: {}", path.display());
        }
        if article.archived {
            println!("{}", "archived".yellow());
        }
        if article.platforms.is_empty() {
            println!("Not published anywhere.");
            return Ok(0);
        }
        let rows: Vec<PlatformRow> = article
            .platforms
            .iter()
            .map(|(platform, publication)| PlatformRow {
                platform: platform.to_string(),
                status: publication_label(publication),
                id: publication.article_id.clone().unwrap_or_default(),
                url: publication.url.clone().unwrap_or_default(),
                updated: publication
                    .updated_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(0)
    }

    fn show_all(&self, ws: &Workspace) -> Result<u8> {
        let articles: Vec<(CanonicalUrl, ArticleRecord)> = ws
            .registry
            .get_all_articles()?
            .into_iter()
            .filter(|(_, article)| self.all || !article.archived)
            .collect();

        if self.json {
            let payload: Vec<ArticleJson<'_>> = articles
                .iter()
                .map(|(url, record)| ArticleJson {
                    canonical_url: url,
                    record,
                })
                .collect();
            print_json(&payload)?;
            return Ok(0);
        }

        if articles.is_empty() {
            println!("No articles tracked in {}.", ws.registry.store().location());
            return Ok(0);
        }
        let rows: Vec<ArticleRow> = articles
            .iter()
            .map(|(url, article)| ArticleRow {
                title: article.title.clone().unwrap_or_default(),
                url: url.to_string(),
                live: article.platforms.values().filter(|p| p.is_live()).count(),
                failed: article
                    .platforms
                    .values()
                    .filter(|p| p.last_error.is_some())
                    .count(),
                archived: if article.archived { "yes" } else { "" }.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(0)
    }
}

fn publication_label(publication: &PlatformPublication) -> String {
    let base = if publication.is_deleted() {
        "DELETED".bright_black().to_string()
    } else if publication.is_published() {
        let label = if publication.is_thread { "THREAD" } else { "PUBLISHED" };
        label.green().to_string()
    } else {
        "NOT PUBLISHED".bright_black().to_string()
    };
    match &publication.last_error {
        Some(error) => format!("{base} {}", format!("(failed: {})", error.message).red()),
        None => base,
    }
}
