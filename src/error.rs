use std::path::PathBuf;

use thiserror::Error;

/// Failure confined to a single input document.
#[derive(Debug, Error)]
#[error("{name}: {kind}")]
pub struct DocumentError {
    pub name: String,
    pub kind: DocumentErrorKind,
}

#[derive(Debug, Error)]
pub enum DocumentErrorKind {
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("detection panicked: {0}")]
    Panicked(String),
}

impl DocumentError {
    pub fn new(name: impl Into<String>, kind: impl Into<DocumentErrorKind>) -> Self {
        DocumentError {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("{} not found, run render first", .0.display())]
    MissingDir(PathBuf),
    #[error("no markdown files found in {}", .0.display())]
    NoFiles(PathBuf),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
