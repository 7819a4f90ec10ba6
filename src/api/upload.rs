use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::api::error::ApiError;
use crate::http::multipart::multipart_locate;
use crate::http::request::Request;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub filename: String,
    pub size: usize,
    pub path: String,
}

/// Writes the file part of a multipart request into `target_dir`.
///
/// The part is fully validated before the file is created. A failed or
/// short write removes the partial file.
pub async fn save_upload(
    req: &Request,
    target_dir: &Path,
    max_file_size: usize,
) -> Result<UploadResult, ApiError> {
    let part = multipart_locate(
        req.header("Content-Type"),
        &req.body,
        req.content_length(),
        max_file_size,
    )?;

    let path = target_dir.join(&part.filename);

    let mut file = fs::File::create(&path).await.map_err(|e| {
        ApiError::Internal(format!(
            "Failed to create file: {} ({})",
            path.display(),
            e
        ))
    })?;

    let written = async {
        file.write_all(part.data(&req.body)).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(rm) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %rm, "could not remove partial upload");
        }
        return Err(ApiError::Internal(format!("Failed to write file: {e}")));
    }

    Ok(UploadResult {
        success: true,
        filename: part.filename.to_string_lossy().into_owned(),
        size: part.file_size,
        path: path.to_string_lossy().into_owned(),
    })
}
