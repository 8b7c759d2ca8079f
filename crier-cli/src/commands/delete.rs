//! `crier delete`: remove a post from a platform, keeping its history.

use anyhow::Result;
use clap::Args;

use crier_core::PlatformName;
use crier_sync::{publish::delete_publication, BatchReport};

use super::{print_json, print_report, Workspace};

/// Arguments for `crier delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// File path or canonical URL.
    pub target: String,

    /// Platform to delete from.
    #[arg(long, value_name = "PLATFORM")]
    pub from: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl DeleteArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        let url = ws.resolve_target(&self.target)?;
        let platform = PlatformName::from(self.from);
        let result = delete_publication(
            &ws.registry,
            &ws.config.platform_set(&ws.root),
            &url,
            &platform,
        )?;

        let report = BatchReport {
            items: vec![result],
        };
        if self.json {
            print_json(&report)?;
        } else {
            print_report(&report);
        }
        Ok(report.outcome().exit_code())
    }
}
