use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::records::DocumentSet;

#[derive(Debug, Error)]
pub enum DocLoadError {
    #[error("failed to read document set {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document set {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a scraper dump from disk.
///
/// Semantic validation (missing package list, missing constant table) belongs
/// to the assembler; this only gets the bytes into a [`DocumentSet`].
pub fn load_document_set(path: impl AsRef<Path>) -> Result<DocumentSet, DocLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| DocLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DocLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
