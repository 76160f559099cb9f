use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::element_ref::Select;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::DocumentError;

/// Elements that never carry instructions: scripts, styling and page chrome.
static NOISE_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "script, style, noscript, nav, header, footer, \
         [role=navigation], [role=banner], [role=contentinfo]",
    )
    .unwrap()
});

/// Outcome of looking at the input directory.
#[derive(Debug)]
pub enum Scan {
    Missing,
    Empty,
    Ready(DocumentSource),
}

/// Sorted list of candidate files; contents are read on demand.
#[derive(Debug)]
pub struct DocumentSource {
    paths: Vec<PathBuf>,
}

/// File contents before parsing. `Send`, unlike the parsed tree.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub name: String,
    pub html: String,
}

/// One HTML file with non-content elements removed.
pub struct ParsedDocument {
    pub name: String,
    pub html: Html,
}

impl DocumentSource {
    /// Directory read errors are fatal; an absent directory or no
    /// matching files is reported through [`Scan`] instead.
    pub fn scan(dir: &Path, extensions: &[String]) -> Result<Scan> {
        if !dir.is_dir() {
            return Ok(Scan::Missing);
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let path = entry
                .with_context(|| format!("listing {}", dir.display()))?
                .path();
            if path.is_file() && has_extension(&path, extensions) {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Ok(Scan::Empty);
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!(dir = %dir.display(), files = paths.len(), "scanned input directory");
        Ok(Scan::Ready(DocumentSource { paths }))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Lazily read each file in name order. A bad file yields an `Err`
    /// item and iteration moves on.
    pub fn documents(&self) -> impl Iterator<Item = Result<RawDocument, DocumentError>> + '_ {
        self.paths.iter().map(|p| read_document(p))
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn read_document(path: &Path) -> Result<RawDocument, DocumentError> {
    let name = file_name(path);
    let bytes = fs::read(path).map_err(|e| DocumentError::new(&name, e))?;
    let html = String::from_utf8(bytes).map_err(|e| DocumentError::new(&name, e))?;
    Ok(RawDocument { name, html })
}

impl ParsedDocument {
    pub fn parse(raw: RawDocument) -> Self {
        let mut html = Html::parse_document(&raw.html);
        strip_noise(&mut html);
        ParsedDocument {
            name: raw.name,
            html,
        }
    }

    /// Matches reachable from the document root. Detached noise stays in
    /// the node arena, so `Html::select` would still return it.
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.root_element().select(selector)
    }

    #[cfg(test)]
    pub fn from_html(name: &str, html: &str) -> Self {
        Self::parse(RawDocument {
            name: name.to_string(),
            html: html.to_string(),
        })
    }
}

fn strip_noise(html: &mut Html) {
    let ids: Vec<_> = html.root_element().select(&NOISE_SEL).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

// ── Tests ──
