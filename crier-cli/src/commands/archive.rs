//! `crier archive` / `crier unarchive`: hide an article from bulk scans.

use anyhow::Result;
use clap::Args;

use super::Workspace;

/// Arguments for `crier archive` and `crier unarchive`.
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// File path or canonical URL.
    pub target: String,
}

impl ArchiveArgs {
    pub fn run(self, ws: &Workspace, archived: bool) -> Result<u8> {
        let url = ws.resolve_target(&self.target)?;
        if !ws.registry.set_archived(&url, archived)? {
            eprintln!("{url} is not tracked; publish it first");
            return Ok(1);
        }
        let verb = if archived { "Archived" } else { "Unarchived" };
        println!("{verb} {url}");
        Ok(0)
    }
}
