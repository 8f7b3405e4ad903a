//! Manifest persistence.
//!
//! Every file is written to a temporary sibling and renamed over the target,
//! so a reader never observes a half-written manifest and a failed run leaves
//! the previous file as it was.

use crate::manifest::ManifestEntry;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render XML sitemap: {0}")]
    Xml(String),
}

/// Write the JSON manifest consumed by the page layer.
pub fn write_json(entries: &[ManifestEntry], path: &Path) -> Result<(), WriteError> {
    let mut json = serde_json::to_string_pretty(entries)?;
    json.push('\n');
    persist(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), entries = entries.len(), "wrote JSON manifest");
    Ok(())
}

/// Write a sitemaps.org `urlset`, one `<url>` per entry.
pub fn write_xml(entries: &[ManifestEntry], path: &Path, base_url: &str) -> Result<(), WriteError> {
    let xml = render_xml(entries, base_url)?;
    persist(path, &xml)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "wrote XML sitemap");
    Ok(())
}

/// Read a previously written manifest.
///
/// A missing file yields an empty list. An unreadable or malformed file is
/// reported and also treated as empty: it will be replaced by this run.
pub fn read_previous(path: &Path) -> Vec<ManifestEntry> {
    if !path.exists() {
        return Vec::new();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<Vec<ManifestEntry>>(&s).map_err(|e| e.to_string()));
    match parsed {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring unreadable previous manifest");
            Vec::new()
        }
    }
}

fn render_xml(entries: &[ManifestEntry], base_url: &str) -> Result<Vec<u8>, WriteError> {
    let origin = base_url.trim_end_matches('/');
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    emit(&mut writer, Event::Start(urlset))?;

    for entry in entries {
        emit(&mut writer, Event::Start(BytesStart::new("url")))?;
        text_element(&mut writer, "loc", &format!("{origin}{}", entry.path))?;
        if let Some(last_modified) = &entry.last_modified {
            text_element(&mut writer, "lastmod", last_modified)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("url")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("urlset")))?;
    let mut xml = writer.into_inner();
    xml.push(b'\n');
    Ok(xml)
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), WriteError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), WriteError> {
    writer
        .write_event(event)
        .map_err(|e| WriteError::Xml(e.to_string()))
}

/// Atomically replace `path` with `bytes`.
fn persist(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let io_err = |source: std::io::Error| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
