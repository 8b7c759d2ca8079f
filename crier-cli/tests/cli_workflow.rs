#![cfg(unix)]
//! End-to-end runs of the `crier` binary against shell-script platforms.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

/// Answers every action successfully; ids are derived from the platform name.
const OK_SCRIPT: &str = r#"cat >/dev/null
case "$CRIER_ACTION" in
  publish) echo "{\"id\": \"$CRIER_PLATFORM-1\", \"url\": \"https://example.com/$CRIER_PLATFORM/1\"}" ;;
  update) echo '{}' ;;
  delete) echo '{}' ;;
  stats) echo '{"views": 5, "likes": 1}' ;;
esac
"#;

const FAIL_SCRIPT: &str = "cat >/dev/null\necho 'Rate limited' >&2\nexit 1\n";

/// Fails like `FAIL_SCRIPT` but appends each action it receives to `calls.log`.
const LOGGING_FAIL_SCRIPT: &str =
    "cat >/dev/null\necho \"$CRIER_ACTION\" >> calls.log\necho 'Rate limited' >&2\nexit 1\n";

struct Project {
    dir: TempDir,
}

impl Project {
    /// A project with `posts/` as content path and one script per platform.
    fn new(platforms: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join(".crier")).expect("registry dir");
        fs::create_dir_all(root.join("posts")).expect("posts dir");
        fs::create_dir_all(root.join("xdg")).expect("xdg dir");

        let mut config = String::from("content_paths: [posts]\nplatforms:\n");
        for (name, script) in platforms {
            let file = format!("{name}.sh");
            fs::write(root.join(&file), script).expect("write script");
            config.push_str(&format!("  {name}:\n    command: sh {file}\n"));
        }
        fs::write(root.join(".crier/config.yaml"), config).expect("write config");
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn registry_path(&self) -> PathBuf {
        self.root().join(".crier/registry.yaml")
    }

    fn write_post(&self, name: &str, title: &str) -> String {
        let rel = format!("posts/{name}.md");
        fs::write(
            self.root().join(&rel),
            format!(
                "---\ntitle: {title}\ncanonical_url: https://blog.example/{name}\ntags: [rust]\n---\n\n{title} body\n"
            ),
        )
        .expect("write post");
        rel
    }

    fn set_script(&self, name: &str, script: &str) {
        fs::write(self.root().join(format!("{name}.sh")), script).expect("rewrite script");
    }

    fn crier(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("crier"));
        cmd.current_dir(self.root())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("xdg"))
            .env_remove("CRIER_CONFIG")
            .env_remove("CRIER_LOG");
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.crier().args(args).output().expect("run crier");
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[test]
fn audit_lists_missing_pairs_without_writing() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    project.write_post("hello", "Hello");

    project
        .crier()
        .arg("audit")
        .assert()
        .code(0)
        .stdout(contains("MISSING").and(contains("posts/hello.md")))
        .stdout(contains("crier audit --publish"));

    assert!(!project.registry_path().exists());
}

#[test]
fn audit_publish_then_clean_audit() {
    let project = Project::new(&[("devto", OK_SCRIPT), ("hashnode", OK_SCRIPT)]);
    project.write_post("a", "First");
    project.write_post("b", "Second");

    project
        .crier()
        .args(["audit", "--publish"])
        .assert()
        .code(0)
        .stdout(contains("4 succeeded, 0 failed, 0 skipped"));

    let audit = project.json(&["audit", "--json"]);
    assert_eq!(audit["audit"]["missing"].as_array().map(Vec::len), Some(0));
    assert_eq!(audit["audit"]["up_to_date"].as_array().map(Vec::len), Some(4));
    assert_eq!(audit["exit_code"], 0);

    let registry = fs::read_to_string(project.registry_path()).expect("registry written");
    assert!(registry.contains("version: 2"));
    assert!(registry.contains("https://blog.example/a"));
    assert!(registry.contains("devto-1"));
    assert!(registry.contains("source_file: posts/a.md"));
}

#[test]
fn audit_dry_run_publishes_nothing() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    project.write_post("a", "First");

    project
        .crier()
        .args(["audit", "--publish", "--dry-run"])
        .assert()
        .code(0)
        .stdout(contains("would publish"));

    assert!(!project.registry_path().exists());
}

#[test]
fn partial_failure_exits_two_and_retry_recovers() {
    let project = Project::new(&[("devto", OK_SCRIPT), ("medium", FAIL_SCRIPT)]);
    project.write_post("a", "First");

    project
        .crier()
        .args(["audit", "--publish"])
        .assert()
        .code(2)
        .stdout(contains("Rate limited"));

    let failures = project.json(&["failures", "--json"]);
    let rows = failures.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["platform"], "medium");
    assert_eq!(rows[0]["message"], "Rate limited");
    assert_eq!(rows[0]["operation"], "publish");

    project.set_script("medium", OK_SCRIPT);
    project
        .crier()
        .args(["audit", "--retry"])
        .assert()
        .code(0);

    let failures = project.json(&["failures", "--json"]);
    assert_eq!(failures.as_array().map(Vec::len), Some(0));
}

#[test]
fn retry_with_publish_calls_each_pair_once() {
    let project = Project::new(&[("medium", LOGGING_FAIL_SCRIPT)]);
    project.write_post("a", "First");

    project.crier().args(["audit", "--publish"]).assert().code(1);
    let calls = fs::read_to_string(project.root().join("calls.log")).expect("calls log");
    assert_eq!(calls.lines().count(), 1);

    let output = project.json(&["audit", "--retry", "--publish", "--json"]);
    assert_eq!(output["retry"]["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(output["publish"]["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(output["exit_code"], 1);

    let calls = fs::read_to_string(project.root().join("calls.log")).expect("calls log");
    assert_eq!(calls.lines().collect::<Vec<_>>(), vec!["publish", "publish"]);
}

#[test]
fn total_failure_exits_one() {
    let project = Project::new(&[("medium", FAIL_SCRIPT)]);
    project.write_post("a", "First");
    project.write_post("b", "Second");

    project
        .crier()
        .args(["audit", "--publish"])
        .assert()
        .code(1)
        .stdout(contains("0 succeeded, 2 failed"));

    project
        .crier()
        .arg("failures")
        .assert()
        .code(0)
        .stdout(contains("2 failure(s)"));
}

#[test]
fn unknown_profile_is_an_error() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    project.write_post("a", "First");

    project
        .crier()
        .args(["audit", "--profile", "nope"])
        .assert()
        .code(1)
        .stderr(contains("unknown profile 'nope'"));
}

#[test]
fn corrupt_registry_fails_loudly_and_is_left_alone() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    project.write_post("a", "First");
    fs::write(project.registry_path(), "articles: [unclosed").expect("corrupt registry");

    project
        .crier()
        .args(["audit", "--publish"])
        .assert()
        .code(1)
        .stderr(contains("registry.yaml"));

    assert_eq!(
        fs::read_to_string(project.registry_path()).expect("registry"),
        "articles: [unclosed"
    );
}

// ---------------------------------------------------------------------------
// Single-file publish
// ---------------------------------------------------------------------------

#[test]
fn publish_file_then_skip_when_unchanged() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");

    project
        .crier()
        .args(["publish", &post])
        .assert()
        .code(0)
        .stdout(contains("published"));

    project
        .crier()
        .args(["publish", &post])
        .assert()
        .code(0)
        .stdout(contains("skipped"));
}

#[test]
fn publish_file_updates_after_edit() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");
    project.crier().args(["publish", &post]).assert().code(0);

    project.write_post("a", "First, revised");
    let report = project.json(&["publish", &post, "--json"]);
    assert_eq!(report["items"][0]["status"], "updated");
    assert_eq!(report["items"][0]["article_id"], "devto-1");
}

#[test]
fn publish_to_unconfigured_platform_fails() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");

    project
        .crier()
        .args(["publish", &post, "--to", "medium"])
        .assert()
        .code(1)
        .stdout(contains("platform not configured"));
}

// ---------------------------------------------------------------------------
// Status, archive, delete, forget, stats
// ---------------------------------------------------------------------------

#[test]
fn status_of_untracked_article_exits_one() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);

    project
        .crier()
        .args(["status", "https://blog.example/nowhere"])
        .assert()
        .code(1)
        .stderr(contains("not tracked"));
}

#[test]
fn status_shows_publications() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");
    project.crier().args(["publish", &post]).assert().code(0);

    project
        .crier()
        .args(["status", &post])
        .assert()
        .code(0)
        .stdout(contains("PUBLISHED").and(contains("devto-1")));

    let all = project.json(&["status", "--json"]);
    assert_eq!(all[0]["canonical_url"], "https://blog.example/a");
    assert_eq!(all[0]["platforms"]["devto"]["article_id"], "devto-1");
}

#[test]
fn archived_articles_drop_out_of_bulk_audit() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");
    project.crier().args(["publish", &post]).assert().code(0);
    project.write_post("a", "First, revised");

    project.crier().args(["archive", &post]).assert().code(0);
    project
        .crier()
        .arg("audit")
        .assert()
        .code(0)
        .stdout(contains("1 archived file(s) skipped"))
        .stdout(contains("CHANGED").not());

    project.crier().args(["unarchive", &post]).assert().code(0);
    let audit = project.json(&["audit", "--json", "--include-changed"]);
    assert_eq!(audit["audit"]["changed"].as_array().map(Vec::len), Some(1));
}

#[test]
fn archive_requires_a_tracked_article() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);

    project
        .crier()
        .args(["archive", "https://blog.example/nowhere"])
        .assert()
        .code(1);
}

#[test]
fn delete_marks_the_pair_missing_again() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");
    project.crier().args(["publish", &post]).assert().code(0);

    project
        .crier()
        .args(["delete", &post, "--from", "devto"])
        .assert()
        .code(0)
        .stdout(contains("deleted"));

    let audit = project.json(&["audit", "--json"]);
    assert_eq!(audit["audit"]["missing"].as_array().map(Vec::len), Some(1));

    let registry = fs::read_to_string(project.registry_path()).expect("registry");
    assert!(registry.contains("deleted_at"));
}

#[test]
fn forget_removes_records_without_calling_platforms() {
    let project = Project::new(&[("devto", OK_SCRIPT), ("hashnode", OK_SCRIPT)]);
    let post = project.write_post("a", "First");
    project.crier().args(["publish", &post]).assert().code(0);

    project
        .crier()
        .args(["forget", "https://blog.example/a", "--platform", "devto"])
        .assert()
        .code(0);
    project
        .crier()
        .args(["forget", "https://blog.example/a", "--platform", "devto"])
        .assert()
        .code(1);

    project
        .crier()
        .args(["forget", "https://blog.example/a"])
        .assert()
        .code(0);
    project
        .crier()
        .args(["status", "https://blog.example/a"])
        .assert()
        .code(1);
}

#[test]
fn stats_refresh_caches_counters() {
    let project = Project::new(&[("devto", OK_SCRIPT)]);
    let post = project.write_post("a", "First");
    project.crier().args(["publish", &post]).assert().code(0);

    project
        .crier()
        .arg("stats")
        .assert()
        .code(0)
        .stdout(contains("No stats cached"));

    let rows = project.json(&["stats", "--refresh", "--json"]);
    assert_eq!(rows[0]["platform"], "devto");
    assert_eq!(rows[0]["views"], 5);
    assert_eq!(rows[0]["likes"], 1);
    assert_eq!(rows[0]["comments"], Value::Null);
}
