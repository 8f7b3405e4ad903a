//! Arena-backed route tree.
//!
//! Nodes live in a single `Vec` owned by [`RouteTree`] and refer to each other
//! by [`NodeId`]. Children are owned through their parent's `children` map;
//! the `parent` field is a plain index, so upward lookups never form a
//! reference cycle.
//!
//! Node 0 is always the root (`/`). Children are keyed by URL segment in a
//! `BTreeMap`, which gives every traversal the same lexicographic sibling
//! order without a separate sort step.

use crate::naming::route_segment;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Two page directories resolve to the same canonical route.
///
/// Only reachable through route groups: `(a)/about/page.tsx` and
/// `(b)/about/page.tsx` both serve `/about`.
#[derive(Error, Debug)]
#[error("Duplicate route {route}: defined by both {} and {}", .first.display(), .second.display())]
pub struct DuplicateRouteError {
    pub route: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Index of a node inside its [`RouteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

/// Inclusion instruction attached to a single node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Directive {
    Include,
    Exclude,
    /// No directive of its own: takes the parent's verdict.
    #[default]
    Inherit,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Include => write!(f, "include"),
            Directive::Exclude => write!(f, "exclude"),
            Directive::Inherit => write!(f, "inherit"),
        }
    }
}

/// Display metadata attached to a node by the loader or the config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteMeta {
    pub label: Option<String>,
    pub description: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RouteNode {
    pub segments: Vec<String>,
    pub parent: Option<NodeId>,
    pub directive: Directive,
    pub children: BTreeMap<String, NodeId>,
    /// Page file that makes this node routable. `None` for pure ancestors.
    pub page: Option<PathBuf>,
    pub meta: RouteMeta,
}

impl RouteNode {
    pub fn is_routable(&self) -> bool {
        self.page.is_some()
    }

    /// Canonical route identifier, e.g. `/include/sneaky-me`.
    pub fn route(&self) -> String {
        route_of(&self.segments)
    }

    /// Served path with exactly one trailing slash, e.g. `/include/sneaky-me/`.
    pub fn served_path(&self) -> String {
        served_path(&self.segments)
    }
}

#[derive(Debug, Clone)]
pub struct RouteTree {
    nodes: Vec<RouteNode>,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    /// A tree holding only a non-routable root.
    pub fn new() -> Self {
        Self {
            nodes: vec![RouteNode {
                segments: Vec::new(),
                parent: None,
                directive: Directive::Inherit,
                children: BTreeMap::new(),
                page: None,
                meta: RouteMeta::default(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut RouteNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes that carry a page.
    pub fn routable_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_routable()).count()
    }

    /// Look up the node with exactly these segments.
    pub fn find(&self, segments: &[String]) -> Option<NodeId> {
        let mut current = self.root();
        for segment in segments {
            current = *self.node(current).children.get(segment)?;
        }
        Some(current)
    }

    /// Return the node for `segments`, creating it and any missing ancestors.
    pub fn ensure(&mut self, segments: &[String]) -> NodeId {
        let mut current = self.root();
        for (depth, segment) in segments.iter().enumerate() {
            current = match self.node(current).children.get(segment) {
                Some(&child) => child,
                None => {
                    let id = NodeId(self.nodes.len());
                    self.nodes.push(RouteNode {
                        segments: segments[..=depth].to_vec(),
                        parent: Some(current),
                        directive: Directive::Inherit,
                        children: BTreeMap::new(),
                        page: None,
                        meta: RouteMeta::default(),
                    });
                    self.node_mut(current).children.insert(segment.clone(), id);
                    id
                }
            };
        }
        current
    }

    /// Register a page file for `segments`.
    ///
    /// Fails if another page already claimed the same route.
    pub fn insert_page(
        &mut self,
        segments: &[String],
        page: &Path,
    ) -> Result<NodeId, DuplicateRouteError> {
        let id = self.ensure(segments);
        let node = self.node_mut(id);
        if let Some(existing) = &node.page {
            return Err(DuplicateRouteError {
                route: route_of(segments),
                first: existing.clone(),
                second: page.to_path_buf(),
            });
        }
        node.page = Some(page.to_path_buf());
        Ok(id)
    }

    /// Depth-first pre-order walk, root first, siblings in segment order.
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![(self.root(), 0)],
        }
    }
}

/// Iterator over `(node, depth)` pairs in pre-order.
///
/// Uses an explicit stack so deep route trees cannot overflow the call stack.
pub struct PreOrder<'a> {
    tree: &'a RouteTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for PreOrder<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        // Reverse so the lexicographically smallest child is popped first.
        for &child in self.tree.node(id).children.values().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((id, depth))
    }
}

/// Join segments into a route identifier: `/a/b`, or `/` for the root.
pub fn route_of(segments: &[String]) -> String {
    format!("/{}", segments.join("/"))
}

/// Join segments into a served path: `/a/b/`, or `/` for the root.
pub fn served_path(segments: &[String]) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Split a user-written route (`/a/b`, `a/b/`, `//a//b`) into segments.
///
/// Segments may be spelled as on disk: `/(shop)/blog/[slug]` gives the same
/// segments as `/blog/:slug`.
pub fn parse_route(route: &str) -> Vec<String> {
    route
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(route_segment)
        .collect()
}
