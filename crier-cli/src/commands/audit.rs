//! `crier audit`: what is missing, changed or failed, and optionally fix it.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crier_core::{CanonicalUrl, PlatformName};
use crier_sync::{
    audit::{reconcile, AuditItem, AuditOptions, AuditReport, AuditStatus},
    content::discover,
    publish::publish_items,
    retry::{retry_failures, RetryOptions},
    BatchReport,
};

use super::{print_json, print_report, Workspace};

/// Arguments for `crier audit`.
#[derive(Args, Debug)]
pub struct AuditArgs {
    /// File or directory to scan (defaults to the configured content paths).
    pub path: Option<PathBuf>,

    /// Platform to check (repeatable; defaults to every enabled platform).
    #[arg(long = "to", short = 't', value_name = "PLATFORM")]
    pub to: Vec<String>,

    /// Check the platforms of a configured profile.
    #[arg(long, short = 'p')]
    pub profile: Option<String>,

    /// List changed articles (otherwise they are only counted).
    #[arg(long)]
    pub include_changed: bool,

    /// Include archived articles.
    #[arg(long)]
    pub include_archived: bool,

    /// Publish missing articles and update changed ones.
    #[arg(long)]
    pub publish: bool,

    /// Retry every recorded failure before auditing.
    #[arg(long)]
    pub retry: bool,

    /// With --publish / --retry: report what would happen without doing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct AuditJson<'a> {
    audit: &'a AuditReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<&'a BatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    publish: Option<&'a BatchReport>,
    exit_code: u8,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "platform")]
    platform: String,
    #[tabled(rename = "status")]
    status: String,
}

impl AuditArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        let platforms = ws
            .config
            .target_platforms(&self.to, self.profile.as_deref())?;
        if platforms.is_empty() {
            bail!("no platforms to audit; pass --to or configure platforms");
        }
        let platform_set = ws.config.platform_set(&ws.root);

        let retry_report = if self.retry {
            let report = retry_failures(
                &ws.registry,
                &platform_set,
                ws.loader(),
                &ws.root,
                RetryOptions {
                    dry_run: self.dry_run,
                },
            )
            .context("retry failed")?;
            Some(report)
        } else {
            None
        };

        let scan = match &self.path {
            Some(path) => vec![path.clone()],
            None => ws.config.content_paths_in(&ws.root),
        };
        if scan.is_empty() {
            bail!("no content paths; pass a PATH or set content_paths in the config");
        }
        let files = discover(ws.loader(), &scan, &ws.root).context("failed to scan content")?;
        let state = ws.registry.snapshot()?;
        let audit = reconcile(
            &state,
            &files,
            &platforms,
            AuditOptions {
                include_changed: self.include_changed || self.publish,
                include_archived: self.include_archived,
            },
        );

        let publish_report = if self.publish {
            let items = not_retried(audit.actionable(), retry_report.as_ref());
            let report = publish_items(
                &ws.registry,
                &platform_set,
                ws.loader(),
                &items,
                self.dry_run,
            )
            .context("publish failed")?;
            Some(report)
        } else {
            None
        };

        let mut combined = BatchReport::default();
        for report in [&retry_report, &publish_report].into_iter().flatten() {
            combined.items.extend(report.items.iter().cloned());
        }
        let exit_code = combined.outcome().exit_code();

        if self.json {
            print_json(&AuditJson {
                audit: &audit,
                retry: retry_report.as_ref(),
                publish: publish_report.as_ref(),
                exit_code,
            })?;
            return Ok(exit_code);
        }

        print_audit(&audit, files.len(), platforms.len());
        if let Some(report) = &retry_report {
            println!("{}", "Retry".bold());
            print_report(report);
        }
        if let Some(report) = &publish_report {
            let heading = if self.dry_run { "Publish (dry run)" } else { "Publish" };
            println!("{}", heading.bold());
            print_report(report);
        } else if !audit.is_clean() {
            println!("Run 'crier audit --publish' to publish missing articles.");
        }
        Ok(exit_code)
    }
}

/// Drop the pairs the retry pass already attempted, so each pair gets at most
/// one platform call per run.
fn not_retried(items: Vec<AuditItem>, retry: Option<&BatchReport>) -> Vec<AuditItem> {
    let Some(retry) = retry else {
        return items;
    };
    let retried: BTreeSet<(&CanonicalUrl, &PlatformName)> = retry
        .items
        .iter()
        .filter_map(|item| Some((item.canonical_url.as_ref()?, &item.platform)))
        .collect();
    items
        .into_iter()
        .filter(|item| {
            item.canonical_url
                .as_ref()
                .map_or(true, |url| !retried.contains(&(url, &item.platform)))
        })
        .collect()
}

fn print_audit(audit: &AuditReport, file_count: usize, platform_count: usize) {
    println!(
        "{} files × {} platforms | {} missing | {} changed | {} up to date",
        file_count,
        platform_count,
        audit.missing.len().to_string().red(),
        (audit.changed.len() + audit.changed_skipped).to_string().yellow(),
        audit.up_to_date.len().to_string().green(),
    );
    if audit.archived_skipped > 0 {
        println!("{} archived file(s) skipped", audit.archived_skipped);
    }
    if audit.changed_skipped > 0 {
        println!(
            "{} changed pair(s) hidden; use --include-changed to list them",
            audit.changed_skipped
        );
    }

    let rows: Vec<AuditRow> = audit
        .missing
        .iter()
        .chain(&audit.changed)
        .map(row)
        .collect();
    if rows.is_empty() {
        println!("{}", "Everything is published and up to date.".green());
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn row(item: &AuditItem) -> AuditRow {
    AuditRow {
        file: item.path.display().to_string(),
        platform: item.platform.to_string(),
        status: match item.status {
            AuditStatus::Missing => "MISSING".red().to_string(),
            AuditStatus::Changed => "CHANGED".yellow().to_string(),
            AuditStatus::UpToDate => "UP TO DATE".green().to_string(),
        },
    }
}
