use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::normalize::collapse_whitespace;

pub const MIN_STEPS: usize = 2;

/// Tentative procedure emitted by one detection strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub steps: Vec<String>,
}

/// A titled, ordered list of at least two instruction steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    title: String,
    steps: Vec<String>,
    source_file: String,
}

impl Procedure {
    /// Returns `None` for an empty title or fewer than two non-empty steps.
    pub fn new(title: &str, steps: Vec<String>, source_file: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let steps: Vec<String> = steps
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect();
        if steps.len() < MIN_STEPS {
            return None;
        }
        Some(Procedure {
            title: title.to_string(),
            steps,
            source_file: source_file.to_string(),
        })
    }

    pub fn from_candidate(candidate: Candidate, source_file: &str) -> Option<Self> {
        Self::new(&candidate.title, candidate.steps, source_file)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Steps as they appear in a numbered list: trimmed, single-spaced.
    pub fn display_steps(&self) -> impl Iterator<Item = String> + '_ {
        self.steps.iter().map(|s| collapse_whitespace(s))
    }
}

/// Final, deduplicated output of one extraction run.
#[derive(Debug, Default)]
pub struct ProcedureStore {
    procedures: Vec<Procedure>,
}

impl ProcedureStore {
    pub fn new(procedures: Vec<Procedure>) -> Self {
        ProcedureStore { procedures }
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Procedure> {
        self.procedures.iter()
    }

    pub fn write_json(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.procedures).map_err(|source| {
            StoreError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(io_err)
    }

    /// Records are re-checked on load; entries breaking the step/title rules are skipped.
    pub fn read_json(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: Vec<Procedure> =
            serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let procedures = raw
            .into_iter()
            .filter_map(|p| Procedure::new(&p.title, p.steps, &p.source_file))
            .collect();
        Ok(ProcedureStore { procedures })
    }
}

impl<'a> IntoIterator for &'a ProcedureStore {
    type Item = &'a Procedure;
    type IntoIter = std::slice::Iter<'a, Procedure>;

    fn into_iter(self) -> Self::IntoIter {
        self.procedures.iter()
    }
}

// ── Tests ──
