//! Route dispatch.
//!
//! Routes match on path prefix (`/` only matches exactly), tried in a fixed
//! order. Path-like parameters are percent-decoded before use; a missing
//! required parameter is answered without touching the filesystem.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::api::error::ApiError;
use crate::api::files::{self, FileDownload, Success};
use crate::api::{sysinfo, ui, upload};
use crate::http::decode::url_decode_path;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::server::ServerContext;

/// Outcome of dispatching one request.
#[derive(Debug)]
pub enum Reply {
    /// Fully materialized response.
    Full(Response),
    /// Attachment streamed from disk after its head.
    File(FileDownload),
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Full(response)
    }
}

fn decoded_path(raw: &str) -> PathBuf {
    url_decode_path(raw)
}

/// Decoded `path` parameter, or the configured default directory when it
/// is absent or empty.
fn dir_param(req: &Request, ctx: &ServerContext) -> PathBuf {
    match req.query_param("path") {
        Some(raw) if !raw.is_empty() => decoded_path(raw),
        _ => ctx.config.storage.default_dir.clone(),
    }
}

fn path_required() -> Response {
    Response::text(StatusCode::NotFound, "Path required")
}

fn parameters_required() -> Response {
    Response::text(StatusCode::NotFound, "Parameters required")
}

fn render<T, F>(result: Result<T, ApiError>, route: &str, ok: F) -> Response
where
    F: FnOnce(T) -> Response,
{
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            warn!(route, status = e.status().as_u16(), error = %e, "operation failed");
            e.into_response()
        }
    }
}

pub async fn dispatch(req: &Request, ctx: &ServerContext) -> Reply {
    let route = req.path.as_str();
    debug!(method = ?req.method, route, "dispatching request");

    if route == "/" {
        return ui::index().into();
    }

    if route.starts_with("/api/list") {
        let dir = dir_param(req, ctx);
        return render(files::list_dir(&dir).await, route, |listing| {
            Response::json(StatusCode::Ok, &listing)
        })
        .into();
    }

    if route.starts_with("/api/download") {
        let Some(raw) = req.query_param("path") else {
            return path_required().into();
        };
        return match files::open_download(&decoded_path(raw)).await {
            Ok(download) => Reply::File(download),
            Err(e) => {
                warn!(route, error = %e, "download failed");
                e.into_text_response().into()
            }
        };
    }

    if route.starts_with("/api/delete") {
        let Some(raw) = req.query_param("path") else {
            return path_required().into();
        };
        let path = decoded_path(raw);
        return render(files::delete_path(&path).await, route, |()| {
            info!(path = %path.display(), "deleted");
            Success::response()
        })
        .into();
    }

    if route.starts_with("/api/sysinfo") {
        return Response::json(StatusCode::Ok, &sysinfo::collect(ctx).await).into();
    }

    if route.starts_with("/api/rename") {
        let (Some(old), Some(new)) = (req.query_param("old"), req.query_param("new")) else {
            return parameters_required().into();
        };
        let (old, new) = (decoded_path(old), decoded_path(new));
        return render(files::rename_path(&old, &new).await, route, |()| {
            info!(old = %old.display(), new = %new.display(), "renamed");
            Success::response()
        })
        .into();
    }

    if route.starts_with("/api/copy") {
        let (Some(src), Some(dst)) = (req.query_param("src"), req.query_param("dst")) else {
            return parameters_required().into();
        };
        let (src, dst) = (decoded_path(src), decoded_path(dst));
        let chunk_size = ctx.config.server.chunk_size;
        return render(files::copy_file(&src, &dst, chunk_size).await, route, |bytes| {
            info!(src = %src.display(), dst = %dst.display(), bytes, "copied");
            Success::response()
        })
        .into();
    }

    if route.starts_with("/api/upload") {
        if req.method != Method::POST {
            return Response::method_not_allowed().into();
        }
        let dir = dir_param(req, ctx);
        let max = ctx.config.storage.max_upload_bytes;
        return render(upload::save_upload(req, &dir, max).await, route, |saved| {
            ctx.counters.record_transfer(saved.size as u64);
            info!(path = %saved.path, size = saved.size, "upload stored");
            Response::json(StatusCode::Ok, &saved)
        })
        .into();
    }

    Response::not_found().into()
}
