use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tracing::warn;

use crate::error::ValidateError;
use crate::render::PROCEDURE_HEADING;

pub const REQUIRED_FIELDS: &[&str] = &["product", "module", "version", "persona", "content_type"];

const MAX_WORDS: usize = 1000;
const MIN_WORDS: usize = 50;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct FileReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub files: Vec<(String, FileReport)>,
}

impl ValidationSummary {
    pub fn error_count(&self) -> usize {
        self.files.iter().map(|(_, r)| r.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|(_, r)| r.warnings.len()).sum()
    }

    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }

    pub fn print(&self) {
        for (name, report) in self.files.iter().filter(|(_, r)| !r.is_clean()) {
            println!("{}", name);
            for e in &report.errors {
                println!("   ERROR: {}", e);
            }
            for w in &report.warnings {
                println!("   WARNING: {}", w);
            }
        }
        println!();
        let (errors, warnings) = (self.error_count(), self.warning_count());
        if errors > 0 {
            println!("Validation FAILED: {} error(s), {} warning(s)", errors, warnings);
        } else if warnings > 0 {
            println!("Validation PASSED with {} warning(s)", warnings);
        } else {
            println!("Validation PASSED: {} files ready for ingestion", self.files.len());
        }
    }
}

/// Check one rendered procedure for the markers ingestion depends on.
pub fn validate_text(text: &str) -> FileReport {
    let mut report = FileReport::default();

    match text.strip_prefix("---") {
        None => report.errors.push("Missing front-matter".to_string()),
        Some(rest) => match rest.find("\n---") {
            None => report.errors.push("Unterminated front-matter".to_string()),
            Some(end) => check_front_matter(&rest[..end], &mut report),
        },
    }

    if !text.contains(PROCEDURE_HEADING) {
        report.errors.push(format!("Missing '{}' section", PROCEDURE_HEADING));
    }

    let sequences = text.matches("\n1.").count();
    if sequences == 0 {
        report.errors.push("Missing numbered steps (no '1.' found)".to_string());
    } else if sequences > 1 {
        report.warnings.push(format!("Multiple step sequences found ({})", sequences));
    }

    if !text.starts_with("# ") && !text.contains("\n# ") {
        report.errors.push("Missing title heading".to_string());
    }

    let words = text.split_whitespace().count();
    if words > MAX_WORDS {
        report.warnings.push(format!("Large file ({} words) - may need chunking", words));
    } else if words < MIN_WORDS {
        report.warnings.push(format!("Small file ({} words) - verify content", words));
    }

    report
}

fn check_front_matter(block: &str, report: &mut FileReport) {
    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(fields)) => {
            for field in REQUIRED_FIELDS {
                if !fields.contains_key(*field) {
                    report.errors.push(format!("Missing required field: {}", field));
                }
            }
        }
        Ok(_) => report
            .errors
            .push("Invalid YAML frontmatter: expected a mapping".to_string()),
        Err(e) => report.errors.push(format!("Invalid YAML frontmatter: {}", e)),
    }
}

/// Validate every `*.md` file in `dir`, in file name order.
pub fn validate_dir(dir: &Path) -> Result<ValidationSummary, ValidateError> {
    if !dir.is_dir() {
        return Err(ValidateError::MissingDir(dir.to_path_buf()));
    }
    let io_err = |source| ValidateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(ValidateError::NoFiles(dir.to_path_buf()));
    }
    paths.sort();

    let mut summary = ValidationSummary::default();
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| ValidateError::Io {
            path: path.clone(),
            source,
        })?;
        let report = validate_text(&text);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !report.errors.is_empty() {
            warn!(file = %name, errors = report.errors.len(), "markdown failed validation");
        }
        summary.files.push((name, report));
    }
    Ok(summary)
}

// ── Tests ──
