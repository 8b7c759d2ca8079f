//! `crier forget`: drop registry records without touching any platform.

use anyhow::Result;
use clap::Args;

use crier_core::{CanonicalUrl, PlatformName};

use super::Workspace;

/// Arguments for `crier forget`.
#[derive(Args, Debug)]
pub struct ForgetArgs {
    /// Canonical URL of the article.
    pub url: String,

    /// Forget only this platform's record (default: the whole article).
    #[arg(long, value_name = "PLATFORM")]
    pub platform: Option<String>,
}

impl ForgetArgs {
    pub fn run(self, ws: &Workspace) -> Result<u8> {
        let url = CanonicalUrl::from(self.url);
        let removed = match &self.platform {
            Some(platform) => ws
                .registry
                .remove_publication(&url, &PlatformName::from(platform.as_str()))?,
            None => ws.registry.remove_article(&url)?,
        };
        if !removed {
            eprintln!("nothing recorded for {url}");
            return Ok(1);
        }
        match &self.platform {
            Some(platform) => println!("Forgot {platform} record of {url}"),
            None => println!("Forgot {url}"),
        }
        Ok(0)
    }
}
