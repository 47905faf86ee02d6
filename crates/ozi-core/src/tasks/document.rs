//! Load and atomically rewrite the task document.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::store::StoreError;
use super::types::TaskDocument;

/// Read and parse the document at `path`. An empty file is an empty document.
pub fn load(path: &Path) -> Result<TaskDocument, StoreError> {
    let data = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if data.trim().is_empty() {
        return Ok(TaskDocument::default());
    }
    serde_yaml::from_str(&data).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the document at `path` in one step: write a temp file in the same
/// directory, fsync it, rename over the target. Readers see either the old or
/// the new document, never a partial one.
pub fn save(path: &Path, doc: &TaskDocument) -> Result<(), StoreError> {
    let yaml = serde_yaml::to_string(doc).map_err(StoreError::Serialize)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let persist_err = |source: std::io::Error| StoreError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".ozi-tasks.")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(persist_err)?;
    tmp.write_all(yaml.as_bytes()).map_err(persist_err)?;
    // Keep the mode of the document being replaced; the temp file starts at 0600.
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(persist_err)?;
    }
    tmp.as_file().sync_all().map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;
    Ok(())
}
