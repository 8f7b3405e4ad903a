//! Manifest synthesis.
//!
//! Turns a resolved [`RouteTree`] into the ordered list of [`ManifestEntry`]
//! values the page layer consumes. Visiting order is the tree's pre-order
//! (root first, siblings sorted by segment), so two runs over the same input
//! always produce the same list.
//!
//! ## Field Sources
//!
//! | Field          | First available wins                                    |
//! |----------------|---------------------------------------------------------|
//! | `label`        | config metadata → previous manifest → derived title     |
//! | `description`  | config metadata → previous manifest → empty string      |
//! | `lastModified` | page file mtime (when enabled), otherwise omitted        |

use crate::naming::default_label;
use crate::resolve::Resolution;
use crate::tree::RouteTree;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One element of the persisted JSON array.
///
/// The page layer destructures these five field names directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub route: String,
    pub path: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Build entries for every included routable node.
pub fn synthesize(tree: &RouteTree, resolution: &Resolution) -> Vec<ManifestEntry> {
    synthesize_with(tree, resolution, &[])
}

/// Like [`synthesize`], but labels and descriptions missing from the tree's
/// metadata are taken from `previous` where it has an entry for the route.
pub fn synthesize_with(
    tree: &RouteTree,
    resolution: &Resolution,
    previous: &[ManifestEntry],
) -> Vec<ManifestEntry> {
    let previous: HashMap<&str, &ManifestEntry> =
        previous.iter().map(|e| (e.route.as_str(), e)).collect();

    tree.preorder()
        .map(|(id, _)| id)
        .filter(|&id| tree.node(id).is_routable() && resolution.is_included(id))
        .map(|id| {
            let node = tree.node(id);
            let route = node.route();
            let prior = previous.get(route.as_str());

            let label = node
                .meta
                .label
                .clone()
                .or_else(|| prior.map(|p| p.label.clone()).filter(|l| !l.is_empty()))
                .unwrap_or_else(|| default_label(&node.segments));
            let description = node
                .meta
                .description
                .clone()
                .or_else(|| prior.map(|p| p.description.clone()))
                .unwrap_or_default();
            let last_modified = node
                .meta
                .last_modified
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true));

            ManifestEntry {
                path: node.served_path(),
                route,
                label,
                description,
                last_modified,
            }
        })
        .collect()
}
