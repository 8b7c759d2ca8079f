//! `crier failures`: platforms whose most recent attempt failed.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crier_core::FailedOperation;

use super::{print_json, Workspace};

/// Arguments for `crier failures`.
#[derive(Args, Debug)]
pub struct FailuresArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize, Tabled)]
struct FailureRow {
    #[tabled(rename = "article")]
    article: String,
    #[tabled(rename = "platform")]
    platform: String,
    #[tabled(rename = "operation")]
    operation: &'static str,
    #[tabled(rename = "error")]
    message: String,
    #[tabled(rename = "failed at")]
    failed_at: String,
    #[tabled(skip)]
    canonical_url: String,
}

impl FailuresArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        let rows: Vec<FailureRow> = ws
            .registry
            .get_failures()?
            .into_iter()
            .map(|f| FailureRow {
                article: f
                    .title
                    .clone()
                    .unwrap_or_else(|| f.canonical_url.to_string()),
                platform: f.platform.to_string(),
                operation: match f.operation {
                    FailedOperation::Publish => "publish",
                    FailedOperation::Delete => "delete",
                },
                message: f.message,
                failed_at: f.failed_at.to_rfc3339(),
                canonical_url: f.canonical_url.to_string(),
            })
            .collect();

        if self.json {
            print_json(&rows)?;
            return Ok(0);
        }
        if rows.is_empty() {
            println!("No failures recorded.");
            return Ok(0);
        }
        let count = rows.len();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!("{count} failure(s). Run 'crier audit --retry' to retry them.");
        Ok(0)
    }
}
