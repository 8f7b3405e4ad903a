//! Generator configuration.
//!
//! Handles loading, validating, and merging `smg.toml`. The file lives in the
//! project root and is entirely optional: stock defaults are used for every
//! key it leaves out.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! app_dir = ""                  # Empty = auto-detect app/ or src/app/
//! base_url = "https://example.com"
//! json_output = "sitemap.json"  # Relative to the project root
//! xml_output = "sitemap.xml"    # Empty string disables the XML sitemap
//! include_last_modified = true  # lastModified from page file mtime
//! preserve_metadata = true      # Keep hand-edited labels from the last run
//!
//! [directives]
//! include = []
//! exclude = ["/admin", "/exclude-children/exclude-1"]
//!
//! [routes."/example"]
//! label = "Example"
//! description = "A page that shows examples"
//!
//! [sitemaps.blog]
//! output = "sitemaps/blog.json"
//! roots = ["/blog"]
//! include_in_main_json = false
//! include_in_main_xml = true
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::tree::{Directive, parse_route, route_of};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File name looked up in the project root.
pub const CONFIG_FILENAME: &str = "smg.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `smg.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmgConfig {
    /// App directory relative to the project root. Empty means auto-detect.
    pub app_dir: String,
    /// Origin prepended to every path in the XML sitemap.
    pub base_url: String,
    /// Main JSON manifest path, relative to the project root.
    pub json_output: String,
    /// XML sitemap path, relative to the project root. Empty disables it.
    pub xml_output: String,
    /// Populate `lastModified` from page file modification times.
    pub include_last_modified: bool,
    /// Carry labels and descriptions over from the previously written manifest.
    pub preserve_metadata: bool,
    /// Include/exclude directives attached to routes.
    pub directives: DirectivesConfig,
    /// Explicit display metadata keyed by route.
    pub routes: BTreeMap<String, RouteMetaConfig>,
    /// Additional manifests covering selected subtrees.
    pub sitemaps: BTreeMap<String, CustomSitemapConfig>,
}

impl Default for SmgConfig {
    fn default() -> Self {
        Self {
            app_dir: String::new(),
            base_url: "https://example.com".to_string(),
            json_output: "sitemap.json".to_string(),
            xml_output: "sitemap.xml".to_string(),
            include_last_modified: true,
            preserve_metadata: true,
            directives: DirectivesConfig::default(),
            routes: BTreeMap::new(),
            sitemaps: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectivesConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteMetaConfig {
    pub label: Option<String>,
    pub description: Option<String>,
}

/// A secondary manifest holding only the routes under `roots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomSitemapConfig {
    /// JSON output path, relative to the project root.
    pub output: String,
    /// Routes whose subtrees make up this sitemap.
    pub roots: Vec<String>,
    /// Keep these routes in the main JSON manifest as well.
    #[serde(default)]
    pub include_in_main_json: bool,
    /// Keep these routes in the main XML sitemap as well.
    #[serde(default)]
    pub include_in_main_xml: bool,
}

impl SmgConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.json_output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "json_output must not be empty".into(),
            ));
        }
        for (name, sitemap) in &self.sitemaps {
            if sitemap.output.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "sitemaps.{name}.output must not be empty"
                )));
            }
            if sitemap.roots.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "sitemaps.{name}.roots must not be empty"
                )));
            }
        }

        // Every output must name a distinct file.
        let mut outputs: Vec<(String, &str)> = vec![("json_output".into(), self.json_output.as_str())];
        if !self.xml_output.trim().is_empty() {
            outputs.push(("xml_output".into(), self.xml_output.as_str()));
        }
        for (name, sitemap) in &self.sitemaps {
            outputs.push((format!("sitemaps.{name}.output"), sitemap.output.as_str()));
        }
        let mut seen: HashMap<PathBuf, &str> = HashMap::new();
        for (key, output) in &outputs {
            if let Some(first) = seen.insert(normalize_output(output), key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "{key} writes to the same file as {first}: {output:?}"
                )));
            }
        }
        Ok(())
    }

    /// Directives as `(route, verdict)` pairs, in file order.
    ///
    /// Routes are normalized, so `exclude/` and `/exclude` name the same node.
    pub fn directive_pairs(&self) -> Vec<(String, Directive)> {
        let include = self
            .directives
            .include
            .iter()
            .map(|r| (normalize_route(r), Directive::Include));
        let exclude = self
            .directives
            .exclude
            .iter()
            .map(|r| (normalize_route(r), Directive::Exclude));
        include.chain(exclude).collect()
    }
}

/// Lexically normalized output path: `./a/../b//c.json` becomes `b/c.json`.
fn normalize_output(output: &str) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in Path::new(output.trim()).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Canonical form of a user-written route: `/a/b`, or `/`.
pub fn normalize_route(route: &str) -> String {
    route_of(&parse_route(route))
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SmgConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SmgConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SmgConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `smg.toml` from the project root, falling back to stock defaults.
pub fn load_config(project: &Path) -> Result<SmgConfig, ConfigError> {
    load_config_file(&project.join(CONFIG_FILENAME))
}

/// Load a config file at an explicit path, falling back to stock defaults
/// when it does not exist.
pub fn load_config_file(config_path: &Path) -> Result<SmgConfig, ConfigError> {
    let overlay = load_raw_config(config_path)?;
    if overlay.is_some() {
        tracing::debug!(path = %config_path.display(), "loaded config");
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock `smg.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# smg configuration
# =================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# App directory relative to the project root.
# Leave empty to auto-detect app/ or src/app/.
app_dir = ""

# Origin prepended to every path in the XML sitemap.
base_url = "https://example.com"

# Main JSON manifest consumed by the page layer.
json_output = "sitemap.json"

# XML sitemap for crawlers. Set to "" to skip it.
xml_output = "sitemap.xml"

# Fill lastModified from the page file's modification time.
include_last_modified = true

# Keep labels and descriptions edited by hand in the previous manifest.
preserve_metadata = true

# ---------------------------------------------------------------------------
# Directives
# ---------------------------------------------------------------------------
# A directive applies to the named route and cascades to every route below
# it, until a descendant carries its own directive. Routes are matched by
# their position in the tree, never by substring.
[directives]
include = []
exclude = []

# ---------------------------------------------------------------------------
# Per-route metadata
# ---------------------------------------------------------------------------
# [routes."/about"]
# label = "About us"
# description = "Who we are"

# ---------------------------------------------------------------------------
# Custom sitemaps
# ---------------------------------------------------------------------------
# Routes under `roots` are written to their own manifest. They are left
# out of the main JSON manifest unless include_in_main_json is true, and
# out of the main XML sitemap unless include_in_main_xml is true.
#
# [sitemaps.blog]
# output = "sitemaps/blog.json"
# roots = ["/blog"]
# include_in_main_json = false
# include_in_main_xml = true
"##
}
