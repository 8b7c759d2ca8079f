//! A platform implemented by a user-supplied shell command.
//!
//! # Protocol
//!
//! The command runs under `sh -c` in the project root with:
//!
//! - `CRIER_ACTION`: `publish`, `update`, `delete` or `stats`
//! - `CRIER_PLATFORM`: the configured platform name
//! - `CRIER_ARTICLE_ID`: the stored post id (all actions except `publish`)
//! - stdin: the article as JSON (`publish` and `update` only)
//!
//! It answers with one JSON object on stdout:
//!
//! ```text
//! {"id": "123", "url": "https://..."}                 publish / update (ids may be numbers)
//! {"thread_ids": [..], "thread_urls": [..]}           publish as a thread
//! {"views": 10, "likes": 2}                           stats
//! {"unsupported": true}                               delete not available
//! {"error": "message"}                                any failure
//! ```
//!
//! A non-zero exit status is a failure; stderr becomes the message.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;

use crier_core::{PublishOutcome, StatCounts};
use crier_sync::{Article, DeleteOutcome, Platform};

#[derive(Debug, Clone)]
pub struct CommandPlatform {
    name: String,
    command: String,
    cwd: PathBuf,
}

/// A post id as a platform reports it. Numeric ids keep their JSON spelling.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PostId {
    Text(String),
    Number(serde_json::Number),
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        match id {
            PostId::Text(text) => text,
            PostId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Reply {
    id: Option<PostId>,
    url: Option<String>,
    thread_ids: Vec<PostId>,
    thread_urls: Vec<String>,
    error: Option<String>,
    unsupported: bool,
    views: Option<u64>,
    likes: Option<u64>,
    comments: Option<u64>,
    reposts: Option<u64>,
}

impl CommandPlatform {
    pub fn new(name: &str, command: &str, cwd: &Path) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Run one action and parse the reply. `Err` carries a failure message.
    fn call(
        &self,
        action: &str,
        article_id: Option<&str>,
        article: Option<&Article>,
    ) -> Result<Reply, String> {
        let stdin = match article {
            Some(article) => serde_json::to_vec(article).map_err(|e| e.to_string())?,
            None => Vec::new(),
        };

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&self.command)
            .current_dir(&self.cwd)
            .env("CRIER_ACTION", action)
            .env("CRIER_PLATFORM", &self.name)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        match article_id {
            Some(id) => cmd.env("CRIER_ARTICLE_ID", id),
            None => cmd.env_remove("CRIER_ARTICLE_ID"),
        };

        tracing::debug!("{}: running {action} command", self.name);
        let mut child = cmd
            .spawn()
            .map_err(|e| format!("failed to run {} command: {e}", self.name))?;
        if let Some(mut pipe) = child.stdin.take() {
            // A command that ignores its input may close the pipe early.
            if let Err(e) = pipe.write_all(&stdin) {
                tracing::debug!("{}: stdin not consumed: {e}", self.name);
            }
        }
        let output = child
            .wait_with_output()
            .map_err(|e| format!("failed to wait for {} command: {e}", self.name))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(if stderr.is_empty() {
                format!("{} command exited with {}", self.name, output.status)
            } else {
                stderr
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply: Reply = if stdout.trim().is_empty() {
            Reply::default()
        } else {
            serde_json::from_str(stdout.trim())
                .map_err(|e| format!("invalid reply from {} command: {e}", self.name))?
        };
        match reply.error {
            Some(message) => Err(message),
            None => Ok(reply),
        }
    }

    fn publish_outcome(&self, result: Result<Reply, String>, fallback_id: Option<&str>) -> PublishOutcome {
        let reply = match result {
            Ok(reply) => reply,
            Err(message) => return PublishOutcome::Failure { message },
        };
        let ids: Vec<String> = reply.thread_ids.into_iter().map(String::from).collect();
        if let Some(root_id) = ids.first().cloned() {
            return PublishOutcome::Thread {
                root_id,
                root_url: reply.url.or_else(|| reply.thread_urls.first().cloned()),
                ids,
                urls: reply.thread_urls,
            };
        }
        match reply
            .id
            .map(String::from)
            .or_else(|| fallback_id.map(str::to_string))
        {
            Some(article_id) => PublishOutcome::Success {
                article_id,
                url: reply.url,
            },
            None => PublishOutcome::failure(format!("{} command returned no id", self.name)),
        }
    }
}

impl Platform for CommandPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn publish(&self, article: &Article) -> PublishOutcome {
        self.publish_outcome(self.call("publish", None, Some(article)), None)
    }

    fn update(&self, article_id: &str, article: &Article) -> PublishOutcome {
        self.publish_outcome(
            self.call("update", Some(article_id), Some(article)),
            Some(article_id),
        )
    }

    fn delete(&self, article_id: &str) -> DeleteOutcome {
        match self.call("delete", Some(article_id), None) {
            Ok(reply) if reply.unsupported => DeleteOutcome::Unsupported,
            Ok(_) => DeleteOutcome::Deleted,
            Err(message) => DeleteOutcome::Failed { message },
        }
    }

    fn get_stats(&self, article_id: &str) -> Option<StatCounts> {
        let reply = match self.call("stats", Some(article_id), None) {
            Ok(reply) => reply,
            Err(message) => {
                tracing::warn!("{}: stats unavailable: {message}", self.name);
                return None;
            }
        };
        let counts = StatCounts {
            views: reply.views,
            likes: reply.likes,
            comments: reply.comments,
            reposts: reply.reposts,
        };
        (counts != StatCounts::default()).then_some(counts)
    }
}
