//! Reading picked paths into candidate files.

use super::CandidateFile;
use crate::common::IntakeError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads each path into memory, keeping the given order.
pub async fn read_paths(paths: &[PathBuf]) -> Result<Vec<CandidateFile>, IntakeError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_one(path).await?);
    }
    Ok(files)
}

#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
async fn read_one(path: &Path) -> Result<CandidateFile, IntakeError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => IntakeError::NotFound(path.to_path_buf()),
        _ => IntakeError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(IntakeError::NotAFile(path.to_path_buf()));
    }

    let contents = tokio::fs::read(path).await.map_err(|e| IntakeError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    Ok(CandidateFile::new(name, contents))
}
