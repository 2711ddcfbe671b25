//! JSON file helpers shared by the cache and the plan history.

use std::path::Path;

use grantplan_core::errors::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read and decode `path`. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StorageError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Encode `value` as pretty JSON and replace `path` with it. The document is
/// written next to the target first, so readers never see a partial file.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let encoded = serde_json::to_string_pretty(value).map_err(|e| StorageError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let staging = path.with_extension("partial");
    std::fs::write(&staging, encoded).map_err(|source| StorageError::Io {
        path: staging.clone(),
        source,
    })?;
    std::fs::rename(&staging, path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}
