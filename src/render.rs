use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::procedure::{Procedure, ProcedureStore};
use crate::settings::DocMetadata;

/// Section marker the downstream validator and ingestion look for.
pub const PROCEDURE_HEADING: &str = "## Procedure";
pub const CONTENT_TYPE: &str = "procedure";

const MAX_SLUG_CHARS: usize = 80;

static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Front-matter block, in the field order ingestion expects.
#[derive(Debug, Serialize)]
struct FrontMatter<'a> {
    product: &'a str,
    module: &'a str,
    version: &'a str,
    persona: &'a str,
    content_type: &'a str,
    title: &'a str,
}

pub fn render_markdown(p: &Procedure, meta: &DocMetadata) -> Result<String, serde_yaml::Error> {
    let front = serde_yaml::to_string(&FrontMatter {
        product: &meta.product,
        module: &meta.module,
        version: &meta.version,
        persona: &meta.persona,
        content_type: CONTENT_TYPE,
        title: p.title(),
    })?;

    let mut md = String::new();
    md.push_str("---\n");
    md.push_str(&front);
    md.push_str("---\n\n");
    md.push_str(&format!("# {}\n\n", p.title()));
    md.push_str(PROCEDURE_HEADING);
    md.push_str("\n\n");
    for (i, step) in p.display_steps().enumerate() {
        md.push_str(&format!("{}. {}\n", i + 1, step));
    }
    Ok(md)
}

/// File-name-safe form of a title: `Reset Password` becomes `reset_password`.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lower, "_");
    let slug: String = slug.trim_matches('_').chars().take(MAX_SLUG_CHARS).collect();
    if slug.is_empty() {
        "procedure".to_string()
    } else {
        slug
    }
}

/// Replace every `*.md` in `dir` with one file per procedure.
pub fn write_all(store: &ProcedureStore, meta: &DocMetadata, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    clear_markdown(dir)?;

    let mut used: HashSet<String> = HashSet::new();
    let mut written = Vec::with_capacity(store.len());
    for p in store {
        let slug = unique_slug(slugify(p.title()), &mut used);
        let path = dir.join(format!("{}.md", slug));
        let md = render_markdown(p, meta).with_context(|| format!("front-matter for {:?}", p.title()))?;
        fs::write(&path, md).with_context(|| format!("writing {}", path.display()))?;
        debug!(file = %path.display(), source = p.source_file(), steps = p.steps().len(), "rendered");
        written.push(path);
    }
    info!(files = written.len(), dir = %dir.display(), "markdown written");
    Ok(written)
}

fn clear_markdown(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "md") {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        }
    }
    Ok(())
}

/// Titles that differ only in punctuation share a slug; later ones get a suffix.
fn unique_slug(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(title: &str, steps: &[&str]) -> Procedure {
        Procedure::new(title, steps.iter().map(|s| s.to_string()).collect(), "a.html").unwrap()
    }

    fn meta() -> DocMetadata {
        DocMetadata {
            product: "Springbrook".into(),
            module: "Accounts Payable".into(),
            version: "2024".into(),
            persona: "support_agent".into(),
        }
    }

    /// Split rendered Markdown into parsed front-matter and body.
    fn split(md: &str) -> (serde_yaml::Value, String) {
        let rest = md.strip_prefix("---\n").unwrap();
        let (front, body) = rest.split_once("\n---\n").unwrap();
        (serde_yaml::from_str(front).unwrap(), body.to_string())
    }

    #[test]
    fn markdown_layout() {
        let md = render_markdown(&proc("Reset Password", &["Open settings", "  Click \n reset "]), &meta()).unwrap();
        let (front, body) = split(&md);

        let keys: Vec<&str> = front
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, ["product", "module", "version", "persona", "content_type", "title"]);
        assert_eq!(front["product"], "Springbrook");
        assert_eq!(front["module"], "Accounts Payable");
        assert_eq!(front["version"], "2024");
        assert_eq!(front["persona"], "support_agent");
        assert_eq!(front["content_type"], "procedure");
        assert_eq!(front["title"], "Reset Password");

        assert_eq!(body, "\n# Reset Password\n\n## Procedure\n\n1. Open settings\n2. Click reset\n");
    }

    #[test]
    fn bullet_substeps_are_trimmed() {
        let md = render_markdown(&proc("Entering Invoices", &["Step 1: Open", "  • Select menu"]), &meta()).unwrap();
        assert!(md.contains("\n2. • Select menu\n"));
    }

    #[test]
    fn quotes_survive_front_matter() {
        let md = render_markdown(&proc(r#"Use the "Void" action"#, &["a", "b"]), &meta()).unwrap();
        let (front, body) = split(&md);
        assert_eq!(front["title"], r#"Use the "Void" action"#);
        assert!(body.contains("# Use the \"Void\" action\n"));
    }

    #[test]
    fn yaml_special_characters_in_metadata() {
        let meta = DocMetadata {
            product: "Springbrook: Cloud".into(),
            module: "#AP".into(),
            ..meta()
        };
        let md = render_markdown(&proc("Void: a check", &["a", "b"]), &meta).unwrap();
        let (front, _) = split(&md);
        assert_eq!(front["product"], "Springbrook: Cloud");
        assert_eq!(front["module"], "#AP");
        assert_eq!(front["title"], "Void: a check");
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Reset Password"), "reset_password");
        assert_eq!(slugify("  A/P: Void a Check!  "), "a_p_void_a_check");
        assert_eq!(slugify("!!!"), "procedure");
        assert_eq!(slugify(&"x".repeat(120)).len(), 80);
    }

    #[test]
    fn write_all_replaces_old_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale.md"), "old").unwrap();
        fs::write(dir.path().join("keep.txt"), "other").unwrap();

        let store = ProcedureStore::new(vec![
            proc("Reset Password", &["a", "b"]),
            proc("Reset password!", &["c", "d"]),
        ]);
        let written = write_all(&store, &meta(), dir.path()).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["reset_password.md", "reset_password_2.md"]);
        assert!(!dir.path().join("stale.md").exists());
        assert!(dir.path().join("keep.txt").exists());
    }
}
