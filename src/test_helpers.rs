//! Shared test utilities for the smg test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let tree = scan::load(&fixture_app_dir(tmp.path())).unwrap();
//!
//! let mut tree = fixture_tree();
//! let resolution = resolve(&mut tree, &fixture_directives()).unwrap();
//! let entries = synthesize(&tree, &resolution);
//! assert_eq!(find_entry(&entries, "/include").label, "Include");
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::manifest::ManifestEntry;
use crate::tree::{Directive, RouteTree, parse_route};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/next-app/` to a temp directory and return it.
///
/// Tests get an isolated copy they can write manifests into.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/next-app");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

/// The app directory inside a copied fixture project.
pub fn fixture_app_dir(project: &Path) -> PathBuf {
    project.join("src").join("app")
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create `<root>/<dir>/page.tsx`. An empty `dir` writes the root page.
pub fn write_page(root: &Path, dir: &str) {
    let dir = root.join(dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("page.tsx"), "export default function Page() {}\n").unwrap();
}

/// Routes of the fixture app, every one of them a page.
pub const FIXTURE_ROUTES: &[&str] = &[
    "/",
    "/example",
    "/exclude-children",
    "/exclude-children/exclude-1",
    "/exclude-children/exclude-1/exclude-1-child-1",
    "/exclude-children/exclude-1/exclude-1-child-2",
    "/exclude-children/exclude-2",
    "/exclude-children/exclude-3",
    "/exclude",
    "/include",
    "/include/sneaky-me",
];

/// In-memory tree matching the fixture app, without touching the filesystem.
pub fn fixture_tree() -> RouteTree {
    let mut tree = RouteTree::new();
    for route in FIXTURE_ROUTES {
        let segments = parse_route(route);
        let page = Path::new(&segments.join("/")).join("page.tsx");
        tree.insert_page(&segments, &page).unwrap();
    }
    tree
}

/// Directives the fixture app is meant to be generated with.
pub fn fixture_directives() -> Vec<(String, Directive)> {
    vec![
        ("/exclude-children/exclude-1".into(), Directive::Exclude),
        ("/exclude-children/exclude-2".into(), Directive::Exclude),
        ("/exclude-children/exclude-3".into(), Directive::Exclude),
        ("/exclude".into(), Directive::Exclude),
        ("/include".into(), Directive::Include),
    ]
}

// =========================================================================
// Manifest lookups
// =========================================================================

/// Find an entry by route. Panics if not found.
pub fn find_entry<'a>(entries: &'a [ManifestEntry], route: &str) -> &'a ManifestEntry {
    entries.iter().find(|e| e.route == route).unwrap_or_else(|| {
        let routes: Vec<&str> = entries.iter().map(|e| e.route.as_str()).collect();
        panic!("route '{route}' not found. Available: {routes:?}")
    })
}

/// All served paths in manifest order.
pub fn entry_paths(entries: &[ManifestEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.path.as_str()).collect()
}
