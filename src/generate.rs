//! The generator pipeline: load → resolve → synthesize → write.
//!
//! [`plan`] runs every stage that can fail on bad input and keeps the results
//! in memory. [`run`] calls it and only then touches the output files, so a
//! scan error, a directive conflict or a duplicate route never overwrites a
//! previously valid manifest.
//!
//! ## Custom Sitemaps
//!
//! Each `[sitemaps.<name>]` block is resolved against its own copy of the
//! tree: the root is excluded, every configured root is included, and the
//! user's directives that sit strictly below one of those roots still apply.
//! Each root also receives an `exclude` directive in the main JSON run unless
//! `include_in_main_json` is set, and in the main XML run unless
//! `include_in_main_xml` is set. The XML sitemap therefore has its own
//! resolution and may list routes the JSON manifest hides.
//!
//! A custom sitemap that ends up empty is not written.

use crate::config::{ConfigError, CustomSitemapConfig, SmgConfig, normalize_route};
use crate::manifest::{ManifestEntry, synthesize, synthesize_with};
use crate::resolve::{DirectiveConflictError, Resolution, resolve};
use crate::scan::{self, ScanError, ScanOptions};
use crate::tree::{Directive, RouteTree, parse_route};
use crate::write::{self, WriteError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error(transparent)]
    DirectiveConflict(#[from] DirectiveConflictError),
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

/// Everything one run computed, before anything is written.
#[derive(Debug)]
pub struct Plan {
    pub app_dir: PathBuf,
    /// Main tree with the main directives attached.
    pub tree: RouteTree,
    pub resolution: Resolution,
    pub json_output: PathBuf,
    pub xml_output: Option<PathBuf>,
    pub base_url: String,
    pub entries: Vec<ManifestEntry>,
    /// Entries for the main XML sitemap. Empty when XML output is disabled.
    pub xml_entries: Vec<ManifestEntry>,
    pub custom: Vec<CustomPlan>,
}

#[derive(Debug)]
pub struct CustomPlan {
    pub name: String,
    pub output: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

/// What [`run`] wrote.
#[derive(Debug)]
pub struct Report {
    pub json_output: PathBuf,
    pub xml_output: Option<PathBuf>,
    pub entries: usize,
    pub xml_entries: usize,
    /// Custom sitemaps actually written; empty ones are skipped.
    pub custom: Vec<(String, PathBuf, usize)>,
}

/// Compute the manifests for `project` without writing anything.
pub fn plan(project: &Path, config: &SmgConfig) -> Result<Plan, GenerateError> {
    config.validate()?;
    let app_dir = scan::find_app_dir(project, &config.app_dir)?;
    let options = ScanOptions {
        last_modified: config.include_last_modified,
    };
    let mut base = scan::load_with(&app_dir, &options)?;
    scan::attach_meta(&mut base, config);

    let json_output = project.join(&config.json_output);
    let xml_output = (!config.xml_output.trim().is_empty()).then(|| project.join(&config.xml_output));

    let mut tree = base.clone();
    let resolution = resolve(&mut tree, &main_directives(config, |s| s.include_in_main_json))?;
    let previous = previous_entries(config, &json_output);
    let entries = synthesize_with(&tree, &resolution, &previous);
    tracing::debug!(
        included = entries.len(),
        pages = tree.routable_count(),
        "resolved main manifest"
    );

    let xml_entries = match &xml_output {
        Some(_) => {
            let mut xml_tree = base.clone();
            let xml_resolution =
                resolve(&mut xml_tree, &main_directives(config, |s| s.include_in_main_xml))?;
            synthesize(&xml_tree, &xml_resolution)
        }
        None => Vec::new(),
    };

    let mut custom = Vec::with_capacity(config.sitemaps.len());
    for (name, sitemap) in &config.sitemaps {
        let mut custom_tree = base.clone();
        let directives = custom_directives(config, &sitemap.roots);
        let custom_resolution = resolve(&mut custom_tree, &directives)?;
        let output = project.join(&sitemap.output);
        let previous = previous_entries(config, &output);
        let entries = synthesize_with(&custom_tree, &custom_resolution, &previous);
        tracing::debug!(sitemap = %name, included = entries.len(), "resolved custom sitemap");
        custom.push(CustomPlan {
            name: name.clone(),
            output,
            entries,
        });
    }

    Ok(Plan {
        app_dir,
        tree,
        resolution,
        json_output,
        xml_output,
        base_url: config.base_url.clone(),
        entries,
        xml_entries,
        custom,
    })
}

/// Plan, then write every manifest.
pub fn run(project: &Path, config: &SmgConfig) -> Result<Report, GenerateError> {
    let plan = plan(project, config)?;
    write_plan(&plan)
}

/// Persist a computed plan.
pub fn write_plan(plan: &Plan) -> Result<Report, GenerateError> {
    write::write_json(&plan.entries, &plan.json_output)?;
    if let Some(xml_output) = &plan.xml_output {
        write::write_xml(&plan.xml_entries, xml_output, &plan.base_url)?;
    }

    let mut custom = Vec::with_capacity(plan.custom.len());
    for sitemap in &plan.custom {
        if sitemap.entries.is_empty() {
            tracing::warn!(sitemap = %sitemap.name, "no routes found for custom sitemap, skipped");
            continue;
        }
        write::write_json(&sitemap.entries, &sitemap.output)?;
        custom.push((
            sitemap.name.clone(),
            sitemap.output.clone(),
            sitemap.entries.len(),
        ));
    }

    Ok(Report {
        json_output: plan.json_output.clone(),
        xml_output: plan.xml_output.clone(),
        entries: plan.entries.len(),
        xml_entries: plan.xml_entries.len(),
        custom,
    })
}

/// Config directives plus an `exclude` on every custom root for which
/// `in_main` is false.
fn main_directives(
    config: &SmgConfig,
    in_main: impl Fn(&CustomSitemapConfig) -> bool,
) -> Vec<(String, Directive)> {
    let mut directives = config.directive_pairs();
    for sitemap in config.sitemaps.values().filter(|s| !in_main(s)) {
        directives.extend(
            sitemap
                .roots
                .iter()
                .map(|root| (normalize_route(root), Directive::Exclude)),
        );
    }
    directives
}

fn custom_directives(config: &SmgConfig, roots: &[String]) -> Vec<(String, Directive)> {
    let root_segments: Vec<Vec<String>> = roots.iter().map(|r| parse_route(r)).collect();

    let mut directives = vec![("/".to_string(), Directive::Exclude)];
    directives.extend(
        roots
            .iter()
            .map(|root| (normalize_route(root), Directive::Include)),
    );
    directives.extend(config.directive_pairs().into_iter().filter(|(route, _)| {
        let segments = parse_route(route);
        root_segments
            .iter()
            .any(|root| segments.len() > root.len() && segments.starts_with(root))
    }));
    directives
}

fn previous_entries(config: &SmgConfig, output: &Path) -> Vec<ManifestEntry> {
    if config.preserve_metadata {
        write::read_previous(output)
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;

    fn fixture_config() -> SmgConfig {
        let mut config = SmgConfig::default();
        config.directives.exclude = vec![
            "/exclude-children/exclude-1".into(),
            "/exclude-children/exclude-2".into(),
            "/exclude-children/exclude-3".into(),
            "/exclude".into(),
        ];
        config.directives.include = vec!["/include".into()];
        config
    }

    fn custom_sitemap(output: &str, root: &str, in_json: bool, in_xml: bool) -> CustomSitemapConfig {
        CustomSitemapConfig {
            output: output.into(),
            roots: vec![root.into()],
            include_in_main_json: in_json,
            include_in_main_xml: in_xml,
        }
    }

    #[test]
    fn plan_fixture_app() {
        let tmp = setup_fixtures();
        let plan = plan(tmp.path(), &fixture_config()).unwrap();

        assert_eq!(plan.app_dir, fixture_app_dir(tmp.path()));
        assert_eq!(
            entry_paths(&plan.entries),
            vec![
                "/",
                "/example/",
                "/exclude-children/",
                "/include/",
                "/include/sneaky-me/"
            ]
        );
        assert_eq!(plan.json_output, tmp.path().join("sitemap.json"));
        assert_eq!(plan.xml_output, Some(tmp.path().join("sitemap.xml")));
    }

    #[test]
    fn plan_writes_nothing() {
        let tmp = setup_fixtures();
        plan(tmp.path(), &fixture_config()).unwrap();
        assert!(!tmp.path().join("sitemap.json").exists());
        assert!(!tmp.path().join("sitemap.xml").exists());
    }

    #[test]
    fn run_writes_json_and_xml() {
        let tmp = setup_fixtures();
        let report = run(tmp.path(), &fixture_config()).unwrap();

        assert_eq!(report.entries, 5);
        let entries = write::read_previous(&report.json_output);
        assert_eq!(entries.len(), 5);
        let xml = fs::read_to_string(report.xml_output.unwrap()).unwrap();
        assert!(xml.contains("<loc>https://example.com/include/sneaky-me/</loc>"));
        assert!(!xml.contains("exclude-1"));
    }

    #[test]
    fn empty_xml_output_skips_xml() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.xml_output = String::new();
        let report = run(tmp.path(), &config).unwrap();
        assert!(report.xml_output.is_none());
        assert!(!tmp.path().join("sitemap.xml").exists());
    }

    #[test]
    fn run_is_idempotent() {
        let tmp = setup_fixtures();
        let config = fixture_config();
        run(tmp.path(), &config).unwrap();
        let first = fs::read(tmp.path().join("sitemap.json")).unwrap();
        run(tmp.path(), &config).unwrap();
        let second = fs::read(tmp.path().join("sitemap.json")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn hand_edited_labels_survive_rebuild() {
        let tmp = setup_fixtures();
        let config = fixture_config();
        let report = run(tmp.path(), &config).unwrap();

        let mut entries = write::read_previous(&report.json_output);
        let example = entries.iter_mut().find(|e| e.route == "/example").unwrap();
        example.label = "Examples".into();
        example.description = "Edited by hand".into();
        write::write_json(&entries, &report.json_output).unwrap();

        run(tmp.path(), &config).unwrap();
        let rebuilt = write::read_previous(&report.json_output);
        let example = find_entry(&rebuilt, "/example");
        assert_eq!(example.label, "Examples");
        assert_eq!(example.description, "Edited by hand");
    }

    #[test]
    fn hand_edits_dropped_when_preservation_disabled() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        run(tmp.path(), &config).unwrap();

        let path = tmp.path().join("sitemap.json");
        let mut entries = write::read_previous(&path);
        entries[0].label = "Start".into();
        write::write_json(&entries, &path).unwrap();

        config.preserve_metadata = false;
        run(tmp.path(), &config).unwrap();
        assert_eq!(find_entry(&write::read_previous(&path), "/").label, "Home");
    }

    #[test]
    fn conflict_keeps_previous_manifest() {
        let tmp = setup_fixtures();
        let path = tmp.path().join("sitemap.json");
        fs::write(&path, "[]\n").unwrap();

        let mut config = fixture_config();
        config.directives.include.push("/exclude".into());
        let result = run(tmp.path(), &config);

        assert!(matches!(
            result,
            Err(GenerateError::DirectiveConflict(ref e)) if e.route == "/exclude"
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }

    #[test]
    fn missing_project_is_scan_error() {
        let tmp = setup_fixtures();
        let result = run(&tmp.path().join("missing"), &fixture_config());
        assert!(matches!(
            result,
            Err(GenerateError::Scan(ScanError::MissingRoot(_)))
        ));
    }

    #[test]
    fn custom_sitemap_takes_subtree_out_of_main() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.sitemaps.insert(
            "includes".into(),
            custom_sitemap("sitemaps/include.json", "/include", false, false),
        );
        // The explicit include on /include would conflict with the implied exclude.
        config.directives.include.clear();

        let plan = plan(tmp.path(), &config).unwrap();
        assert_eq!(
            entry_paths(&plan.entries),
            vec!["/", "/example/", "/exclude-children/"]
        );
        assert_eq!(plan.custom.len(), 1);
        assert_eq!(
            entry_paths(&plan.custom[0].entries),
            vec!["/include/", "/include/sneaky-me/"]
        );
        assert_eq!(plan.custom[0].output, tmp.path().join("sitemaps/include.json"));
    }

    #[test]
    fn custom_sitemap_can_stay_in_main() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.sitemaps.insert(
            "includes".into(),
            custom_sitemap("sitemaps/include.json", "/include", true, true),
        );

        let report = run(tmp.path(), &config).unwrap();
        assert_eq!(report.entries, 5);
        assert_eq!(report.custom, vec![(
            "includes".to_string(),
            tmp.path().join("sitemaps/include.json"),
            2
        )]);
    }

    #[test]
    fn custom_sitemap_applies_nested_directives() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.sitemaps.insert(
            "children".into(),
            custom_sitemap("children.json", "/exclude-children", true, true),
        );

        let plan = plan(tmp.path(), &config).unwrap();
        assert_eq!(
            entry_paths(&plan.custom[0].entries),
            vec!["/exclude-children/"]
        );
    }

    #[test]
    fn custom_root_conflicting_with_explicit_include_is_error() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.sitemaps.insert(
            "includes".into(),
            custom_sitemap("include.json", "/include", false, false),
        );

        let result = plan(tmp.path(), &config);
        assert!(matches!(result, Err(GenerateError::DirectiveConflict(_))));
    }

    #[test]
    fn xml_sitemap_can_keep_routes_hidden_from_json() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.directives.include.clear();
        config.sitemaps.insert(
            "includes".into(),
            custom_sitemap("sitemaps/include.json", "/include", false, true),
        );

        let plan = plan(tmp.path(), &config).unwrap();
        assert_eq!(
            entry_paths(&plan.entries),
            vec!["/", "/example/", "/exclude-children/"]
        );
        assert_eq!(
            entry_paths(&plan.xml_entries),
            vec![
                "/",
                "/example/",
                "/exclude-children/",
                "/include/",
                "/include/sneaky-me/"
            ]
        );

        let report = write_plan(&plan).unwrap();
        assert_eq!((report.entries, report.xml_entries), (3, 5));
        let json = fs::read_to_string(&report.json_output).unwrap();
        let xml = fs::read_to_string(report.xml_output.unwrap()).unwrap();
        assert!(!json.contains("sneaky-me"));
        assert!(xml.contains("<loc>https://example.com/include/sneaky-me/</loc>"));
    }

    #[test]
    fn json_can_keep_routes_hidden_from_xml() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.directives.include.clear();
        config.sitemaps.insert(
            "includes".into(),
            custom_sitemap("sitemaps/include.json", "/include", true, false),
        );

        let plan = plan(tmp.path(), &config).unwrap();
        assert!(plan.entries.iter().any(|e| e.route == "/include/sneaky-me"));
        assert!(plan.xml_entries.iter().all(|e| !e.route.starts_with("/include")));
    }

    #[test]
    fn disabled_xml_has_no_xml_entries() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.xml_output = String::new();
        let plan = plan(tmp.path(), &config).unwrap();
        assert!(plan.xml_entries.is_empty());
    }

    #[test]
    fn shared_custom_output_is_rejected_before_writing() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config
            .sitemaps
            .insert("a".into(), custom_sitemap("custom.json", "/include", true, true));
        config
            .sitemaps
            .insert("b".into(), custom_sitemap("custom.json", "/example", true, true));

        let result = run(tmp.path(), &config);
        assert!(matches!(
            result,
            Err(GenerateError::Config(ConfigError::Validation(_)))
        ));
        assert!(!tmp.path().join("custom.json").exists());
        assert!(!tmp.path().join("sitemap.json").exists());
    }

    #[test]
    fn empty_custom_sitemap_is_not_written() {
        let tmp = setup_fixtures();
        let mut config = fixture_config();
        config.sitemaps.insert(
            "ghost".into(),
            custom_sitemap("ghost.json", "/nothing-here", true, true),
        );

        let report = run(tmp.path(), &config).unwrap();
        assert!(report.custom.is_empty());
        assert!(!tmp.path().join("ghost.json").exists());
        assert_eq!(report.entries, 5);
    }

    #[test]
    fn config_routes_accept_directory_spelling() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = tmp.path().join("app");
        write_page(&app, "");
        write_page(&app, "blog/[slug]");
        write_page(&app, "(marketing)/pricing");
        write_page(&app, "(marketing)/about");

        let mut config = SmgConfig::default();
        config.directives.exclude = vec!["/blog/[slug]".into(), "/(marketing)/pricing".into()];
        config.routes.insert(
            "/(marketing)/about".into(),
            crate::config::RouteMetaConfig {
                label: Some("About us".into()),
                description: None,
            },
        );

        let plan = plan(tmp.path(), &config).unwrap();
        assert_eq!(entry_paths(&plan.entries), vec!["/", "/about/"]);
        assert_eq!(find_entry(&plan.entries, "/about").label, "About us");
    }

    #[test]
    fn custom_roots_accept_directory_spelling() {
        let tmp = tempfile::TempDir::new().unwrap();
        let app = tmp.path().join("app");
        write_page(&app, "");
        write_page(&app, "blog/[slug]");

        let mut config = SmgConfig::default();
        config.sitemaps.insert(
            "posts".into(),
            custom_sitemap("posts.json", "/blog/[slug]", false, false),
        );

        let plan = plan(tmp.path(), &config).unwrap();
        assert_eq!(entry_paths(&plan.entries), vec!["/"]);
        assert_eq!(entry_paths(&plan.custom[0].entries), vec!["/blog/:slug/"]);
    }
}
