use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Looked up with any supported extension (`.yaml`, `.toml`, `.json`, ...).
pub const DEFAULT_CONFIG_PATH: &str = "config/source_urls";
const ENV_PREFIX: &str = "DOCPROC";

/// Constants stamped into every rendered procedure's front-matter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocMetadata {
    #[serde(default = "unknown")]
    pub product: String,
    #[serde(default = "unknown")]
    pub module: String,
    #[serde(default = "unknown")]
    pub version: String,
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

fn default_persona() -> String {
    "support_agent".to_string()
}

impl Default for DocMetadata {
    fn default() -> Self {
        DocMetadata {
            product: unknown(),
            module: unknown(),
            version: unknown(),
            persona: default_persona(),
        }
    }
}

/// File values first, then `DOCPROC_*` environment overrides. A missing
/// file is fine; a malformed one is an error.
pub fn load_metadata(path: &Path) -> Result<DocMetadata> {
    let name = path.to_string_lossy();
    let settings = Config::builder()
        .add_source(File::with_name(&name).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()
        .with_context(|| format!("loading config from {}", name))?;
    settings
        .try_deserialize()
        .with_context(|| format!("invalid metadata in {}", name))
}

// ── Tests ──
