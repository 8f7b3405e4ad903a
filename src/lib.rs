//! # smg
//!
//! A sitemap manifest generator for file-system-routed web applications.
//! The app directory is the data source: every directory holding a page file
//! is a route, and include/exclude directives attached to routes cascade down
//! the tree.
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! 1. Load        app/         →  RouteTree      (filesystem → arena of nodes)
//! 2. Resolve     directives   →  Resolution     (inclusion verdict per node)
//! 3. Synthesize  resolution   →  Vec<ManifestEntry>
//! 4. Write       entries      →  sitemap.json (+ sitemap.xml), atomically
//! ```
//!
//! Stages 1–3 are computed in full before stage 4 runs, so a failing run
//! never replaces a previously valid manifest. Each run starts from scratch;
//! the written files are the only state that outlives it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the app directory and builds the route tree |
//! | [`tree`] | Arena-backed `RouteTree`, `Directive`, route/path normalization |
//! | [`naming`] | Directory-name classification (groups, dynamic segments) and default labels |
//! | [`resolve`] | Attaches directives to nodes and folds verdicts top-down |
//! | [`manifest`] | Ordered `ManifestEntry` synthesis |
//! | [`write`] | Atomic JSON and XML output, previous-manifest reading |
//! | [`config`] | `smg.toml` loading, merging over stock defaults, validation |
//! | [`generate`] | Runs the stages and collects a single error type |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Positional Matching Only
//!
//! A directive belongs to exactly one node, found by walking segments from the
//! root. Nothing matches on substrings of the path text, so an `exclude` on
//! `/exclude` leaves `/exclude-children` alone and `/include/sneaky-me` stays
//! included under an included parent.
//!
//! ## Arena Over Pointers
//!
//! Nodes are stored in one `Vec` and reference each other by index. Parents
//! own children through a sorted map; the parent link is a plain index. The
//! sorted map also fixes the output order: depth-first, siblings by segment.
//!
//! ## Hand Edits Survive
//!
//! Labels and descriptions in an existing manifest are carried into the next
//! one unless `smg.toml` sets them explicitly, so the JSON file can be edited
//! by hand and regenerated.

pub mod config;
pub mod generate;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod resolve;
pub mod scan;
pub mod tree;
pub mod write;

#[cfg(test)]
pub(crate) mod test_helpers;
