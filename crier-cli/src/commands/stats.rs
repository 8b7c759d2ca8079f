//! `crier stats`: cached engagement counters, optionally refreshed.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crier_sync::stats::refresh_stats;

use super::{print_json, print_report, Workspace};

/// Arguments for `crier stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Fetch stats older than `stats_max_age_secs` from the platforms first.
    #[arg(long)]
    pub refresh: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Tabled)]
struct StatsRow {
    #[tabled(rename = "article")]
    article: String,
    #[tabled(rename = "platform")]
    platform: String,
    #[tabled(rename = "views", display_with = "count")]
    views: Option<u64>,
    #[tabled(rename = "likes", display_with = "count")]
    likes: Option<u64>,
    #[tabled(rename = "comments", display_with = "count")]
    comments: Option<u64>,
    #[tabled(rename = "reposts", display_with = "count")]
    reposts: Option<u64>,
    #[tabled(rename = "age")]
    age: String,
}

fn count(value: &Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

impl StatsArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        let mut exit_code = 0;
        if self.refresh {
            let max_age = ws.config.stats_max_age();
            let report = refresh_stats(&ws.registry, &ws.config.platform_set(&ws.root), max_age)
                .context("stats refresh failed")?;
            exit_code = report.outcome().exit_code();
            if !self.json {
                print_report(&report);
            }
        }

        let now = Utc::now();
        let mut rows = Vec::new();
        for (url, article) in ws.registry.get_all_articles()? {
            for (platform, publication) in &article.platforms {
                let Some(stats) = &publication.stats else {
                    continue;
                };
                rows.push(StatsRow {
                    article: article.title.clone().unwrap_or_else(|| url.to_string()),
                    platform: platform.to_string(),
                    views: stats.views,
                    likes: stats.likes,
                    comments: stats.comments,
                    reposts: stats.reposts,
                    age: format_age((now - stats.fetched_at).num_seconds()),
                });
            }
        }

        if self.json {
            print_json(&rows)?;
            return Ok(exit_code);
        }
        if rows.is_empty() {
            println!("No stats cached. Run 'crier stats --refresh'.");
            return Ok(exit_code);
        }
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(exit_code)
    }
}

fn format_age(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
