//! Centralized directory-name parsing for the App Router convention.
//!
//! Every directory under the app root is one of a handful of kinds. This
//! module classifies a directory name into a [`SegmentKind`] and derives the
//! URL segment it contributes, so the scanner, the config directives and the
//! label defaults all agree on what a route looks like.
//!
//! ## Segment Forms
//!
//! | Directory          | Kind                 | URL segment |
//! |--------------------|----------------------|-------------|
//! | `blog`             | static               | `blog`      |
//! | `(marketing)`      | route group          | *(none)*    |
//! | `[id]`             | dynamic              | `:id`       |
//! | `[...slug]`        | catch-all            | `*slug`     |
//! | `[[...slug]]`      | optional catch-all   | `*slug?`    |
//! | `_components`      | private              | *(skipped)* |
//! | `@modal`           | parallel slot        | *(skipped)* |
//!
//! ## Display Labels
//!
//! Dashes and underscores in the final segment become spaces and each word is
//! capitalized: `exclude-1-child-1` → "Exclude 1 Child 1". Dynamic segments
//! get a ` Detail` suffix: `:post-id` → "Post Id Detail". The root is "Home".

/// What a single directory name means to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Plain directory: contributes its own name.
    Static(String),
    /// `[name]`
    Dynamic(String),
    /// `[...name]`
    CatchAll(String),
    /// `[[...name]]`
    OptionalCatchAll(String),
    /// `(name)`: organizes files without adding a URL segment.
    Group,
    /// `_name`, `@slot`, `api`, hidden or vendored directories. The whole
    /// subtree is ignored.
    Ignored,
}

impl SegmentKind {
    /// The URL segment this directory contributes, if any.
    pub fn url_segment(&self) -> Option<String> {
        match self {
            SegmentKind::Static(name) => Some(name.clone()),
            SegmentKind::Dynamic(name) => Some(format!(":{name}")),
            SegmentKind::CatchAll(name) => Some(format!("*{name}")),
            SegmentKind::OptionalCatchAll(name) => Some(format!("*{name}?")),
            SegmentKind::Group | SegmentKind::Ignored => None,
        }
    }
}

/// Classify a directory name.
///
/// - `"blog"` → `Static("blog")`
/// - `"(shop)"` → `Group`
/// - `"[id]"` → `Dynamic("id")`
/// - `"[...slug]"` → `CatchAll("slug")`
/// - `"[[...slug]]"` → `OptionalCatchAll("slug")`
/// - `"_lib"`, `"@modal"`, `"api"`, `".git"`, `"node_modules"` → `Ignored`
pub fn parse_segment(name: &str) -> SegmentKind {
    if name.is_empty()
        || name.starts_with('_')
        || name.starts_with('@')
        || name.starts_with('.')
        || name == "api"
        || name == "node_modules"
    {
        return SegmentKind::Ignored;
    }
    if name.len() > 2 && name.starts_with('(') && name.ends_with(')') {
        return SegmentKind::Group;
    }
    if let Some(inner) = name
        .strip_prefix("[[...")
        .and_then(|rest| rest.strip_suffix("]]"))
    {
        return SegmentKind::OptionalCatchAll(inner.to_string());
    }
    if let Some(inner) = name
        .strip_prefix("[...")
        .and_then(|rest| rest.strip_suffix(']'))
    {
        return SegmentKind::CatchAll(inner.to_string());
    }
    if let Some(inner) = name.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        return SegmentKind::Dynamic(inner.to_string());
    }
    SegmentKind::Static(name.to_string())
}

/// Canonical segment for one piece of a user-written route.
///
/// Directory spellings are accepted alongside URL spellings, so `[slug]` and
/// `:slug` name the same node and `(marketing)` is dropped. Names the scanner
/// would skip are kept verbatim; they match no node and get reported there.
pub fn route_segment(name: &str) -> Option<String> {
    match parse_segment(name) {
        SegmentKind::Group => None,
        SegmentKind::Ignored => Some(name.to_string()),
        kind => kind.url_segment(),
    }
}

/// Default human label for a route given its segments.
pub fn default_label(segments: &[String]) -> String {
    let Some(last) = segments.last() else {
        return "Home".to_string();
    };

    let (words, dynamic) = match last.strip_prefix(':') {
        Some(rest) => (rest, true),
        None => match last.strip_prefix('*') {
            Some(rest) => (rest.trim_end_matches('?'), true),
            None => (last.as_str(), false),
        },
    };

    let title = title_case(&words.replace(['-', '_'], " "));
    if dynamic {
        format!("{title} Detail")
    } else {
        title
    }
}

/// Capitalize the first character of every whitespace-separated word.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
