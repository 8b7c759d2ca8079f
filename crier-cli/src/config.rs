//! User configuration: content locations, platform commands, profiles.
//!
//! Resolution order (first hit wins):
//! 1. `--config <path>`
//! 2. `$CRIER_CONFIG`
//! 3. `<project>/.crier/config.yaml`
//! 4. `<config dir>/crier/config.yaml` (e.g. `~/.config/crier/config.yaml`)
//!
//! No file anywhere means defaults: no platforms, no content paths.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crier_core::PlatformName;
use crier_sync::PlatformSet;

use crate::command_platform::CommandPlatform;

pub const CONFIG_ENV: &str = "CRIER_CONFIG";
const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_STATS_MAX_AGE_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files or directories scanned when no path is given; relative to the project root.
    pub content_paths: Vec<PathBuf>,
    pub platforms: BTreeMap<String, PlatformConfig>,
    /// Named groups of platforms or other profiles.
    pub profiles: BTreeMap<String, Vec<String>>,
    pub stats_max_age_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_paths: Vec::new(),
            platforms: BTreeMap::new(),
            profiles: BTreeMap::new(),
            stats_max_age_secs: DEFAULT_STATS_MAX_AGE_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    /// Shell command implementing the platform (see `command_platform`).
    pub command: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Config {
    /// `stats_max_age_secs` as a duration. Values past what a duration can
    /// hold mean "never stale".
    pub fn stats_max_age(&self) -> chrono::Duration {
        i64::try_from(self.stats_max_age_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Find and load the configuration for a project whose registry lives in
    /// `registry_dir`.
    pub fn discover(explicit: Option<&Path>, registry_dir: &Path) -> Result<Self> {
        match resolve_path(explicit, registry_dir)? {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Platforms named by `--to` plus those of `--profile`; every enabled
    /// configured platform when neither is given.
    pub fn target_platforms(&self, to: &[String], profile: Option<&str>) -> Result<Vec<PlatformName>> {
        let mut names = Vec::new();
        for name in to {
            push_unique(&mut names, name);
        }
        if let Some(profile) = profile {
            for name in self.expand_profile(profile)? {
                push_unique(&mut names, &name);
            }
        }
        if to.is_empty() && profile.is_none() {
            for (name, platform) in &self.platforms {
                if platform.enabled {
                    push_unique(&mut names, name);
                }
            }
        }
        Ok(names.into_iter().map(PlatformName::from).collect())
    }

    /// Expand a profile into platform names. Entries naming another profile
    /// are expanded in place; repeats and cycles are ignored.
    pub fn expand_profile(&self, profile: &str) -> Result<Vec<String>> {
        if !self.profiles.contains_key(profile) {
            bail!("unknown profile '{profile}'");
        }
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();
        self.expand_into(profile, &mut seen, &mut out);
        Ok(out)
    }

    fn expand_into(&self, profile: &str, seen: &mut BTreeSet<String>, out: &mut Vec<String>) {
        if !seen.insert(profile.to_string()) {
            return;
        }
        let Some(entries) = self.profiles.get(profile) else {
            return;
        };
        for entry in entries {
            if self.profiles.contains_key(entry) {
                self.expand_into(entry, seen, out);
            } else {
                push_unique(out, entry);
            }
        }
    }

    /// Build the enabled platforms; commands run in `root`.
    pub fn platform_set(&self, root: &Path) -> PlatformSet {
        self.platforms
            .iter()
            .filter(|(_, p)| p.enabled)
            .map(|(name, p)| {
                Box::new(CommandPlatform::new(name, &p.command, root))
                    as Box<dyn crier_sync::Platform>
            })
            .collect()
    }

    /// Configured content paths made absolute against `root`.
    pub fn content_paths_in(&self, root: &Path) -> Vec<PathBuf> {
        self.content_paths.iter().map(|p| root.join(p)).collect()
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn resolve_path(explicit: Option<&Path>, registry_dir: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let path = PathBuf::from(path);
        if !path.is_file() {
            bail!("config file from ${CONFIG_ENV} not found: {}", path.display());
        }
        return Ok(Some(path));
    }
    let project = registry_dir.join(CONFIG_FILE);
    if project.is_file() {
        return Ok(Some(project));
    }
    Ok(dirs::config_dir()
        .map(|dir| dir.join("crier").join(CONFIG_FILE))
        .filter(|p| p.is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn defaults_apply_to_missing_keys() {
        let cfg = config("platforms:\n  devto:\n    command: ./devto.sh\n");
        assert_eq!(cfg.stats_max_age_secs, 3600);
        assert!(cfg.platforms["devto"].enabled);
        assert!(cfg.content_paths.is_empty());
    }

    #[test]
    fn target_platforms_default_to_enabled() {
        let cfg = config(
            "platforms:\n  devto: {command: a}\n  medium: {command: b, enabled: false}\n  bluesky: {command: c}\n",
        );
        let names: Vec<_> = cfg
            .target_platforms(&[], None)
            .unwrap()
            .into_iter()
            .map(|p| p.0)
            .collect();
        assert_eq!(names, vec!["bluesky", "devto"]);
    }

    #[test]
    fn profiles_expand_recursively_without_repeats() {
        let cfg = config(
            "profiles:\n  blogs: [devto, hashnode]\n  social: [bluesky, mastodon]\n  everything: [blogs, social, devto]\n  loop: [loop, devto]\n",
        );
        assert_eq!(
            cfg.expand_profile("everything").unwrap(),
            vec!["devto", "hashnode", "bluesky", "mastodon"]
        );
        assert_eq!(cfg.expand_profile("loop").unwrap(), vec!["devto"]);
        assert!(cfg.expand_profile("nope").is_err());
    }

    #[test]
    fn to_and_profile_combine() {
        let cfg = config("profiles:\n  social: [bluesky, devto]\n");
        let names: Vec<_> = cfg
            .target_platforms(&["devto".to_string()], Some("social"))
            .unwrap()
            .into_iter()
            .map(|p| p.0)
            .collect();
        assert_eq!(names, vec!["devto", "bluesky"]);
    }

    #[test]
    fn explicit_path_must_exist() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.yaml");
        assert!(Config::discover(Some(&missing), tmp.path()).is_err());
    }

    #[test]
    fn load_from_reads_fields() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("config.yaml"),
            "content_paths: [posts]\nstats_max_age_secs: 10\n",
        )
        .unwrap();
        let cfg = Config::load_from(&tmp.path().join("config.yaml")).unwrap();
        assert_eq!(cfg.stats_max_age_secs, 10);
        assert_eq!(cfg.content_paths_in(Path::new("/blog")), vec![PathBuf::from("/blog/posts")]);
    }

    #[test]
    fn huge_stats_max_age_saturates() {
        assert_eq!(config("stats_max_age_secs: 90\n").stats_max_age(), chrono::Duration::seconds(90));
        let cfg = config(&format!("stats_max_age_secs: {}\n", u64::MAX));
        assert_eq!(cfg.stats_max_age(), chrono::Duration::MAX);
        let cfg = config(&format!("stats_max_age_secs: {}\n", i64::MAX));
        assert_eq!(cfg.stats_max_age(), chrono::Duration::MAX);
    }
}
