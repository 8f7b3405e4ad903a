//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Routes
//! /  Home
//!     example/  Example
//!     exclude/  excluded [exclude]
//!     exclude-children/  Exclude Children
//!         exclude-1/  excluded [exclude]
//!             exclude-1-child-1/  excluded
//!     blog/  (no page)
//!
//! 5 of 11 pages included
//! XML sitemap: 7 routes
//! ```
//!
//! ## Build
//!
//! ```text
//! Wrote 5 routes → src/sitemaps/sitemap.json
//! Wrote 7 URLs → public/sitemap.xml
//! Wrote 2 routes for 'blog' → sitemaps/blog.json
//! ```

use crate::generate::{Plan, Report};
use crate::manifest::ManifestEntry;
use crate::resolve::Resolution;
use crate::tree::{Directive, RouteTree};
use std::collections::HashMap;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `base` when possible.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Format the resolved route tree, one node per line.
///
/// Included pages show their manifest label; excluded pages say so, and a
/// node's own directive is shown in brackets.
pub fn format_tree(
    tree: &RouteTree,
    resolution: &Resolution,
    entries: &[ManifestEntry],
) -> Vec<String> {
    let labels: HashMap<&str, &str> = entries
        .iter()
        .map(|e| (e.route.as_str(), e.label.as_str()))
        .collect();

    let mut lines = vec!["Routes".to_string()];
    for (id, depth) in tree.preorder() {
        let node = tree.node(id);
        let name = match node.segments.last() {
            Some(segment) => format!("{segment}/"),
            None => "/".to_string(),
        };

        let status = if !node.is_routable() {
            "(no page)".to_string()
        } else if resolution.is_included(id) {
            labels
                .get(node.route().as_str())
                .map(|l| l.to_string())
                .unwrap_or_default()
        } else {
            "excluded".to_string()
        };

        let mut line = format!("{}{}  {}", indent(depth), name, status);
        if node.directive != Directive::Inherit {
            line.push_str(&format!(" [{}]", node.directive));
        }
        lines.push(line.trim_end().to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "{} of {} pages included",
        entries.len(),
        tree.routable_count()
    ));
    lines
}

/// Format the `check` command output.
pub fn format_check_output(plan: &Plan, project: &Path) -> Vec<String> {
    let mut lines = vec![format!("App: {}", display_path(&plan.app_dir, project))];
    lines.extend(format_tree(&plan.tree, &plan.resolution, &plan.entries));
    if plan.xml_output.is_some() {
        lines.push(format!("XML sitemap: {} routes", plan.xml_entries.len()));
    }
    for sitemap in &plan.custom {
        lines.push(format!(
            "Sitemap '{}': {} routes",
            sitemap.name,
            sitemap.entries.len()
        ));
    }
    lines
}

/// Format the `build` command output.
pub fn format_build_output(report: &Report, project: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Wrote {} routes → {}",
        report.entries,
        display_path(&report.json_output, project)
    )];
    if let Some(xml) = &report.xml_output {
        lines.push(format!(
            "Wrote {} URLs → {}",
            report.xml_entries,
            display_path(xml, project)
        ));
    }
    for (name, output, count) in &report.custom {
        lines.push(format!(
            "Wrote {} routes for '{}' → {}",
            count,
            name,
            display_path(output, project)
        ));
    }
    lines
}

pub fn print_check_output(plan: &Plan, project: &Path) {
    for line in format_check_output(plan, project) {
        println!("{}", line);
    }
}

pub fn print_build_output(report: &Report, project: &Path) {
    for line in format_build_output(report, project) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::synthesize;
    use crate::resolve::resolve;
    use crate::test_helpers::*;
    use crate::tree::parse_route;
    use std::path::PathBuf;

    #[test]
    fn tree_lists_every_node_with_status() {
        let mut tree = fixture_tree();
        let resolution = resolve(&mut tree, &fixture_directives()).unwrap();
        let entries = synthesize(&tree, &resolution);

        let lines = format_tree(&tree, &resolution, &entries);
        assert_eq!(lines[0], "Routes");
        assert_eq!(lines[1], "/  Home");
        assert!(lines.contains(&"    example/  Example".to_string()));
        assert!(lines.contains(&"    exclude/  excluded [exclude]".to_string()));
        assert!(lines.contains(&"    exclude-children/  Exclude Children".to_string()));
        assert!(lines.contains(&"        exclude-1/  excluded [exclude]".to_string()));
        assert!(lines.contains(&"            exclude-1-child-1/  excluded".to_string()));
        assert!(lines.contains(&"    include/  Include [include]".to_string()));
        assert_eq!(lines.last().unwrap(), "5 of 11 pages included");
    }

    #[test]
    fn tree_marks_ancestors_without_page() {
        let mut tree = RouteTree::new();
        tree.insert_page(&parse_route("/blog/:slug"), Path::new("blog/[slug]/page.tsx"))
            .unwrap();
        let resolution = resolve(&mut tree, &[]).unwrap();
        let entries = synthesize(&tree, &resolution);

        let lines = format_tree(&tree, &resolution, &entries);
        assert_eq!(lines[1], "/  (no page)");
        assert_eq!(lines[2], "    blog/  (no page)");
        assert_eq!(lines[3], "        :slug/  Slug Detail");
        assert_eq!(lines.last().unwrap(), "1 of 1 pages included");
    }

    #[test]
    fn check_output_reports_xml_count() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let plan = crate::generate::plan(tmp.path(), &config).unwrap();

        let lines = format_check_output(&plan, tmp.path());
        assert_eq!(lines[0], "App: src/app");
        assert_eq!(lines.last().unwrap(), "XML sitemap: 5 routes");
    }

    #[test]
    fn build_output_uses_relative_paths() {
        let project = PathBuf::from("/work/site");
        let report = Report {
            json_output: project.join("src/sitemaps/sitemap.json"),
            xml_output: Some(project.join("public/sitemap.xml")),
            entries: 5,
            xml_entries: 7,
            custom: vec![("blog".into(), project.join("sitemaps/blog.json"), 2)],
        };

        let lines = format_build_output(&report, &project);
        assert_eq!(
            lines,
            vec![
                "Wrote 5 routes → src/sitemaps/sitemap.json",
                "Wrote 7 URLs → public/sitemap.xml",
                "Wrote 2 routes for 'blog' → sitemaps/blog.json",
            ]
        );
    }

    #[test]
    fn build_output_without_xml() {
        let report = Report {
            json_output: PathBuf::from("sitemap.json"),
            xml_output: None,
            entries: 0,
            xml_entries: 0,
            custom: vec![],
        };
        assert_eq!(
            format_build_output(&report, Path::new(".")),
            vec!["Wrote 0 routes → sitemap.json"]
        );
    }
}
