//! Directive attachment and inclusion resolution.
//!
//! Directives are `(route, verdict)` pairs. [`attach`] pins each one to the
//! node with exactly that segment sequence; [`compute`] then folds verdicts
//! top-down:
//!
//! 1. The root's verdict is its own directive, or `Include` when it has none.
//! 2. Every other node takes its own directive, or inherits its parent's
//!    effective verdict.
//! 3. A node is included when its effective verdict is `Include`.
//!
//! Matching is purely positional. `/exclude-children` is not affected by a
//! directive on `/exclude`, and nothing ever looks at substrings of the path
//! text.

use crate::config::normalize_route;
use crate::tree::{Directive, NodeId, RouteTree, parse_route};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// The same route was asked to be both included and excluded.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Conflicting directives for {route}: both include and exclude requested")]
pub struct DirectiveConflictError {
    pub route: String,
}

/// Inclusion verdict for every node of one tree, computed once.
#[derive(Debug, Clone)]
pub struct Resolution {
    included: HashMap<NodeId, bool>,
}

impl Resolution {
    pub fn is_included(&self, id: NodeId) -> bool {
        self.included.get(&id).copied().unwrap_or(false)
    }

    pub fn included_count(&self) -> usize {
        self.included.values().filter(|&&v| v).count()
    }
}

/// Attach directives to the nodes they name.
///
/// Routes are normalized before comparison. Requesting both verdicts for one
/// route, or a verdict opposite to one already attached, is a conflict.
/// Directives naming a route that is not in the tree are logged and skipped.
pub fn attach(
    tree: &mut RouteTree,
    directives: &[(String, Directive)],
) -> Result<(), DirectiveConflictError> {
    let mut wanted: BTreeMap<String, Directive> = BTreeMap::new();
    for (route, directive) in directives {
        if *directive == Directive::Inherit {
            continue;
        }
        let route = normalize_route(route);
        match wanted.get(&route) {
            Some(existing) if existing != directive => {
                return Err(DirectiveConflictError { route });
            }
            _ => {
                wanted.insert(route, *directive);
            }
        }
    }

    // Check every directive before touching the tree, so a conflict leaves it
    // exactly as it was.
    let mut targets = Vec::with_capacity(wanted.len());
    for (route, directive) in wanted {
        let Some(id) = tree.find(&parse_route(&route)) else {
            tracing::warn!(%route, %directive, "directive for unknown route ignored");
            continue;
        };
        let current = tree.node(id).directive;
        if current != Directive::Inherit && current != directive {
            return Err(DirectiveConflictError { route });
        }
        targets.push((id, route, directive));
    }

    for (id, route, directive) in targets {
        tree.node_mut(id).directive = directive;
        tracing::debug!(%route, %directive, "attached directive");
    }
    Ok(())
}

/// Compute the inclusion verdict of every node from the attached directives.
pub fn compute(tree: &RouteTree) -> Resolution {
    let mut included = HashMap::with_capacity(tree.len());
    let root = tree.root();
    let root_verdict = match tree.node(root).directive {
        Directive::Exclude => false,
        Directive::Include | Directive::Inherit => true,
    };

    let mut stack = vec![(root, root_verdict)];
    while let Some((id, verdict)) = stack.pop() {
        included.insert(id, verdict);
        for &child in tree.node(id).children.values() {
            let child_verdict = match tree.node(child).directive {
                Directive::Include => true,
                Directive::Exclude => false,
                Directive::Inherit => verdict,
            };
            stack.push((child, child_verdict));
        }
    }

    Resolution { included }
}

/// Attach `directives`, then compute inclusion for the whole tree.
pub fn resolve(
    tree: &mut RouteTree,
    directives: &[(String, Directive)],
) -> Result<Resolution, DirectiveConflictError> {
    attach(tree, directives)?;
    Ok(compute(tree))
}
