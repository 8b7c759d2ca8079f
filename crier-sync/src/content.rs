//! Content files: front-matter parsing and discovery.
//!
//! A content file is a markdown document that opens with a YAML block
//! delimited by `---` lines. Only files whose front matter carries a `title`
//! take part in reconciliation; everything else is silently ignored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crier_core::{hash_file, CanonicalUrl, ContentHash};

use crate::error::{io_err, SyncError};

/// Index pages are site scaffolding, never articles.
const EXCLUDED_FILE_NAMES: &[&str] = &["_index.md"];
const CONTENT_EXTENSION: &str = "md";

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A loaded article, as handed to a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub canonical_url: Option<CanonicalUrl>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub body: String,
}

/// Loads an [`Article`] from a file path.
pub trait ContentLoader {
    /// `Ok(None)` means the file is not an article (no front matter or no title).
    fn load(&self, path: &Path) -> Result<Option<Article>, SyncError>;
}

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    title: Option<String>,
    canonical_url: Option<String>,
    description: Option<String>,
    #[serde(default)]
    tags: Option<Tags>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    List(Vec<String>),
    One(String),
}

impl Tags {
    fn into_vec(self) -> Vec<String> {
        match self {
            Tags::List(tags) => tags,
            Tags::One(tag) => tag
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Split `text` into its front-matter block and body.
///
/// Returns `None` when the text does not open with a `---` line or the
/// block is never closed.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\r\n")
        .or_else(|| text.strip_prefix("---\n"))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// The default loader: `---` delimited YAML front matter, markdown body.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontMatterLoader;

impl FrontMatterLoader {
    pub fn parse(&self, path: &Path, text: &str) -> Result<Option<Article>, SyncError> {
        let Some((yaml, body)) = split_front_matter(text) else {
            return Ok(None);
        };
        let front: FrontMatter = if yaml.trim().is_empty() {
            FrontMatter::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| SyncError::FrontMatter {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        let Some(title) = front.title.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(Article {
            title,
            canonical_url: front
                .canonical_url
                .filter(|u| !u.trim().is_empty())
                .map(CanonicalUrl::from),
            description: front.description,
            tags: front.tags.map(Tags::into_vec).unwrap_or_default(),
            body: body.trim_start_matches(['\r', '\n']).to_string(),
        }))
    }
}

impl ContentLoader for FrontMatterLoader {
    fn load(&self, path: &Path) -> Result<Option<Article>, SyncError> {
        let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        self.parse(path, &text)
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// A content file as seen by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    /// Path relative to the project root; this is what the registry records.
    pub path: PathBuf,
    /// Where the file actually lives, for loading.
    pub full_path: PathBuf,
    pub canonical_url: Option<CanonicalUrl>,
    pub title: String,
    /// Hash of the raw file bytes.
    pub content_hash: ContentHash,
}

impl ContentFile {
    /// Load and hash one file. `Ok(None)` when it is not an article.
    pub fn load(
        loader: &dyn ContentLoader,
        full_path: &Path,
        root: &Path,
    ) -> Result<Option<Self>, SyncError> {
        let Some(article) = loader.load(full_path)? else {
            return Ok(None);
        };
        let content_hash = hash_file(full_path)?;
        Ok(Some(Self {
            path: relative_to(full_path, root),
            full_path: full_path.to_path_buf(),
            canonical_url: article.canonical_url,
            title: article.title,
            content_hash,
        }))
    }
}

/// Collect the articles under `paths` (files or directories), sorted by path.
///
/// Directories are walked recursively for `*.md`. Files that fail to parse are
/// logged and skipped so one bad file never hides the rest of the tree.
pub fn discover(
    loader: &dyn ContentLoader,
    paths: &[PathBuf],
    root: &Path,
) -> Result<Vec<ContentFile>, SyncError> {
    let mut candidates = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut candidates)?;
        } else if path.is_file() {
            candidates.push(path.clone());
        } else {
            tracing::warn!("content path not found: {}", path.display());
        }
    }
    candidates.sort();
    candidates.dedup();

    let mut files = Vec::new();
    for path in candidates {
        match ContentFile::load(loader, &path, root) {
            Ok(Some(file)) => files.push(file),
            Ok(None) => tracing::debug!("not an article: {}", path.display()),
            Err(SyncError::FrontMatter { path, source }) => {
                tracing::warn!("skipping {}: {source}", path.display());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(files)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), SyncError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
        if file_type.is_dir() {
            walk(&path, out)?;
        } else if is_content_file(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_content_file(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CONTENT_EXTENSION));
    let excluded = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| EXCLUDED_FILE_NAMES.contains(&n));
    has_extension && !excluded
}

/// `path` relative to `root` when it lives underneath, otherwise unchanged.
pub fn relative_to(path: &Path, root: &Path) -> PathBuf {
    let path_abs = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let root_abs = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    path_abs
        .strip_prefix(&root_abs)
        .map(Path::to_path_buf)
        .unwrap_or(path_abs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
