//! `crier publish`: publish or update one file on its target platforms.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use crier_sync::{
    audit::{reconcile, AuditOptions},
    publish::publish_items,
};

use super::{print_json, print_report, Workspace};

/// Arguments for `crier publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Markdown file with front matter.
    pub file: PathBuf,

    /// Platform to publish to (repeatable; defaults to every enabled platform).
    #[arg(long = "to", short = 't', value_name = "PLATFORM")]
    pub to: Vec<String>,

    /// Publish to the platforms of a configured profile.
    #[arg(long, short = 'p')]
    pub profile: Option<String>,

    /// Show what would happen without calling any platform.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl PublishArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        let file = ws.content_file(&self.file)?;
        let platforms = ws
            .config
            .target_platforms(&self.to, self.profile.as_deref())?;
        if platforms.is_empty() {
            bail!("no platforms to publish to; pass --to or configure platforms");
        }

        // Explicitly named files are published even when archived.
        let audit = reconcile(
            &ws.registry.snapshot()?,
            std::slice::from_ref(&file),
            &platforms,
            AuditOptions {
                include_changed: true,
                include_archived: true,
            },
        );
        let mut items = audit.actionable();
        items.extend(audit.up_to_date);
        items.sort_by_key(|item| platforms.iter().position(|p| *p == item.platform));

        let report = publish_items(
            &ws.registry,
            &ws.config.platform_set(&ws.root),
            ws.loader(),
            &items,
            self.dry_run,
        )
        .with_context(|| format!("failed to publish {}", self.file.display()))?;

        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }
        Ok(report.outcome().exit_code())
    }
}
