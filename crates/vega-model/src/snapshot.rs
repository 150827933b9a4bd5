use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Api;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    api: Api,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io failed")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed")]
    Codec(#[from] bincode::Error),
    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    VersionMismatch { found: u32 },
}

/// Serialize the entire model to `path`.
///
/// The model's registries are ordered maps and its arenas append-only, so a
/// restored snapshot reproduces byte-identical subsequent emissions to a
/// fresh parse of the same input.
pub fn save_snapshot(api: &Api, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        api: api.clone(),
    };
    let bytes = bincode::serialize(&file)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Api, SnapshotError> {
    let bytes = std::fs::read(path)?;
    let file: SnapshotFile = bincode::deserialize(&bytes)?;
    if file.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: file.version,
        });
    }
    Ok(file.api)
}
