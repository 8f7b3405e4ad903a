//! Route tree loading.
//!
//! Stage 1 of the pipeline. Walks an App Router `app/` directory and builds a
//! [`RouteTree`] with one node per routable directory and one per ancestor of
//! a routable directory.
//!
//! ## Directory Structure
//!
//! ```text
//! src/app/                         # App root (or app/ at the project root)
//! ├── page.tsx                     # /
//! ├── example/page.tsx             # /example
//! ├── (marketing)/                 # Route group: adds no segment
//! │   └── pricing/page.tsx         # /pricing
//! ├── blog/                        # Not routable itself, but an ancestor
//! │   └── [slug]/page.tsx          # /blog/:slug
//! ├── _components/                 # Private: skipped with its subtree
//! └── api/                         # Route handlers: skipped
//! ```
//!
//! A directory is routable when it holds one of [`PAGE_FILES`].
//!
//! ## Validation
//!
//! - The app root must exist and be a directory
//! - No two page directories may resolve to the same route (possible only
//!   through route groups)

use crate::config::{SmgConfig, normalize_route};
use crate::naming::{SegmentKind, parse_segment};
use crate::tree::{DuplicateRouteError, RouteTree, parse_route};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read route directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Route source does not exist: {0}")]
    MissingRoot(PathBuf),
    #[error("Route source is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("No app directory found in {0} (looked for app/ and src/app/)")]
    NoAppDir(PathBuf),
    #[error(transparent)]
    DuplicateRoute(#[from] DuplicateRouteError),
}

/// File names that mark a directory as a page.
pub const PAGE_FILES: &[&str] = &["page.tsx", "page.ts", "page.jsx", "page.js", "page.mdx"];

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Record each page file's modification time as `last_modified`.
    pub last_modified: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            last_modified: true,
        }
    }
}

/// Locate the app directory of a project.
///
/// An explicit `app_dir` (relative to `project`) wins; otherwise `app/` and
/// then `src/app/` are tried.
pub fn find_app_dir(project: &Path, app_dir: &str) -> Result<PathBuf, ScanError> {
    if !project.exists() {
        return Err(ScanError::MissingRoot(project.to_path_buf()));
    }
    if !app_dir.is_empty() {
        return Ok(project.join(app_dir));
    }
    [project.join("app"), project.join("src").join("app")]
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .ok_or_else(|| ScanError::NoAppDir(project.to_path_buf()))
}

/// Load the route tree rooted at `root` with default options.
pub fn load(root: &Path) -> Result<RouteTree, ScanError> {
    load_with(root, &ScanOptions::default())
}

/// Load the route tree rooted at `root`.
pub fn load_with(root: &Path, options: &ScanOptions) -> Result<RouteTree, ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut tree = RouteTree::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_page_file(entry.path()) {
            continue;
        }
        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let Ok(relative) = dir.strip_prefix(root) else {
            continue;
        };

        let segments = segments_for(relative);
        let rel_page = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let id = tree.insert_page(&segments, rel_page)?;

        if options.last_modified {
            let modified = fs::metadata(entry.path())?.modified().ok();
            tree.node_mut(id).meta.last_modified = modified.map(DateTime::<Utc>::from);
        }
        tracing::trace!(route = %tree.node(id).route(), page = %rel_page.display(), "found page");
    }

    tracing::debug!(
        root = %root.display(),
        nodes = tree.len(),
        pages = tree.routable_count(),
        "loaded route tree"
    );
    Ok(tree)
}

/// Attach configured labels and descriptions to their nodes.
///
/// Entries naming a route that is not in the tree are reported and skipped.
pub fn attach_meta(tree: &mut RouteTree, config: &SmgConfig) {
    for (key, meta) in &config.routes {
        let segments = parse_route(key);
        let Some(id) = tree.find(&segments) else {
            tracing::warn!(route = %normalize_route(key), "metadata for unknown route ignored");
            continue;
        };
        let node = tree.node_mut(id);
        if meta.label.is_some() {
            node.meta.label = meta.label.clone();
        }
        if meta.description.is_some() {
            node.meta.description = meta.description.clone();
        }
    }
}

/// URL segments for a directory path relative to the app root.
fn segments_for(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|c| parse_segment(&c.as_os_str().to_string_lossy()).url_segment())
        .collect()
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && parse_segment(&entry.file_name().to_string_lossy()) == SegmentKind::Ignored
}

fn is_page_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| PAGE_FILES.contains(&&*name.to_string_lossy()))
        .unwrap_or(false)
}
