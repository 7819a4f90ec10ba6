//! Filesystem operations: list, download, delete, rename and copy.
//!
//! Paths arrive already percent-decoded. No locking is done; concurrent
//! operations on the same path get whatever the filesystem gives them.

use std::path::Path;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::api::error::ApiError;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::writer::copy_chunked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub mtime: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub path: String,
    pub files: Vec<DirEntry>,
}

#[derive(Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn response() -> Response {
        Response::json(StatusCode::Ok, &Success { success: true })
    }
}

fn entry_from_metadata(name: String, meta: &std::fs::Metadata) -> DirEntry {
    let mtime = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    DirEntry {
        name,
        kind: if meta.is_dir() { EntryKind::Dir } else { EntryKind::File },
        size: meta.len(),
        mtime,
    }
}

/// Lists `dir` in directory order. Entries whose metadata cannot be read
/// are skipped.
pub async fn list_dir(dir: &Path) -> Result<Listing, ApiError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|_| ApiError::NotFound("Directory not found".to_string()))?;

    let mut files = Vec::new();

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "directory read stopped early");
                break;
            }
        };
        // stat semantics: follow symlinks
        let Ok(meta) = fs::metadata(entry.path()).await else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push(entry_from_metadata(name, &meta));
    }

    Ok(Listing {
        path: dir.to_string_lossy().into_owned(),
        files,
    })
}

/// An opened file ready to be streamed as an attachment.
#[derive(Debug)]
pub struct FileDownload {
    pub file: fs::File,
    pub len: u64,
    pub filename: String,
}

impl FileDownload {
    /// Response head announcing the attachment; the file bytes follow it.
    pub fn head(&self) -> Response {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/octet-stream")
            .header("Content-Length", self.len.to_string())
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .build()
    }
}

pub async fn open_download(path: &Path) -> Result<FileDownload, ApiError> {
    let not_found = || ApiError::NotFound("File not found".to_string());

    let file = fs::File::open(path).await.map_err(|_| not_found())?;
    let meta = file.metadata().await.map_err(|_| not_found())?;
    if meta.is_dir() {
        return Err(not_found());
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    Ok(FileDownload {
        file,
        len: meta.len(),
        filename,
    })
}

/// Unlinks a file or removes an empty directory.
pub async fn delete_path(path: &Path) -> Result<(), ApiError> {
    let meta = fs::symlink_metadata(path)
        .await
        .map_err(|_| ApiError::NotFound("Not found".to_string()))?;

    let result = if meta.is_dir() {
        fs::remove_dir(path).await
    } else {
        fs::remove_file(path).await
    };

    result.map_err(|e| {
        debug!(path = %path.display(), error = %e, "delete failed");
        ApiError::Internal("Delete failed".to_string())
    })
}

pub async fn rename_path(old: &Path, new: &Path) -> Result<(), ApiError> {
    fs::rename(old, new).await.map_err(|e| {
        debug!(old = %old.display(), new = %new.display(), error = %e, "rename failed");
        ApiError::Internal("Rename failed".to_string())
    })
}

/// Copies `src` to `dst` (created or truncated) and returns the byte count.
pub async fn copy_file(src: &Path, dst: &Path, chunk_size: usize) -> Result<u64, ApiError> {
    if fs::metadata(src).await.is_err() {
        return Err(ApiError::NotFound(format!(
            "Source not found: {}",
            src.display()
        )));
    }

    let mut source = fs::File::open(src)
        .await
        .map_err(|_| ApiError::NotFound("Cannot open source".to_string()))?;
    let mut dest = fs::File::create(dst)
        .await
        .map_err(|_| ApiError::Internal(format!("Cannot create: {}", dst.display())))?;

    copy_chunked(&mut source, &mut dest, chunk_size)
        .await
        .map_err(|e| {
            debug!(src = %src.display(), dst = %dst.display(), error = %e, "copy failed");
            ApiError::Internal("Copy failed".to_string())
        })
}
