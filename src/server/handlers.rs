use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};
use url::Url;

use super::error::ApiError;
use super::AppState;
use crate::archive::zip_directory;
use crate::fsutil::{cleanup_directory, fresh_temp_root, DirCleanup};
use crate::scdl::{AudioFormat, DownloadOptions};

const BATCH_ARCHIVE_NAME: &str = "tracks_bundle.zip";

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    url: String,
    #[serde(default)]
    format: AudioFormat,
}

pub async fn download_single(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    validate_url(&params.url)?;

    let tmp_root = fresh_temp_root("scdl_api_")
        .map_err(|err| ApiError::BadRequest(format!("could not create temp directory: {err}")))?;

    let options = DownloadOptions::from(params.format);
    let files = match state.scdl.download(&params.url, &tmp_root, &options).await {
        Ok(files) => files,
        Err(err) => {
            cleanup_directory(&tmp_root);
            return Err(ApiError::BadRequest(err.to_string()));
        }
    };

    // scdl can produce several files for a playlist URL; serve the newest.
    let Some(audio_path) = most_recent(files) else {
        cleanup_directory(&tmp_root);
        return Err(ApiError::BadRequest(
            "no audio files were produced by scdl for the given URL".to_string(),
        ));
    };

    let filename = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    let content_type = mime_guess::from_path(&audio_path)
        .first_or_octet_stream()
        .to_string();

    info!("serving {} for {}", filename, params.url);
    attachment_response(
        &audio_path,
        &filename,
        &content_type,
        DirCleanup::new(tmp_root),
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    urls: Vec<String>,
    #[serde(default)]
    format: AudioFormat,
}

pub async fn download_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Response, ApiError> {
    if req.urls.is_empty() {
        return Err(ApiError::Unprocessable("'urls' cannot be empty".to_string()));
    }
    for url in &req.urls {
        validate_url(url)?;
    }

    let tmp_root = fresh_temp_root("scdl_api_batch_")
        .map_err(|err| ApiError::BadRequest(format!("could not create temp directory: {err}")))?;
    let download_dir = tmp_root.join("downloads");
    if let Err(err) = tokio::fs::create_dir_all(&download_dir).await {
        cleanup_directory(&tmp_root);
        return Err(ApiError::BadRequest(err.to_string()));
    }

    let options = DownloadOptions::from(req.format);
    for (index, url) in req.urls.iter().enumerate() {
        // Positional names are unique by construction; each becomes a
        // top-level entry in the archive.
        let subdir = download_dir.join(format!("item_{:03}", index + 1));
        if let Err(err) = state.scdl.download(url, &subdir, &options).await {
            warn!("batch aborted at url {} of {}: {}", index + 1, req.urls.len(), err);
            cleanup_directory(&tmp_root);
            return Err(ApiError::BadRequest(err.to_string()));
        }
    }

    let archive_path = tmp_root.join(BATCH_ARCHIVE_NAME);
    if let Err(err) = zip_directory(&download_dir, &archive_path) {
        cleanup_directory(&tmp_root);
        return Err(ApiError::BadRequest(err.to_string()));
    }

    info!("serving batch archive for {} url(s)", req.urls.len());
    attachment_response(
        &archive_path,
        BATCH_ARCHIVE_NAME,
        "application/zip",
        DirCleanup::new(tmp_root),
    )
    .await
}

fn validate_url(raw: &str) -> Result<(), ApiError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ApiError::Unprocessable(format!(
            "unsupported url scheme '{}'",
            url.scheme()
        ))),
        Err(err) => Err(ApiError::Unprocessable(format!("invalid url: {err}"))),
    }
}

fn most_recent(files: Vec<PathBuf>) -> Option<PathBuf> {
    files.into_iter().max_by_key(|path| modified_time(path))
}

fn modified_time(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or(UNIX_EPOCH)
}

/// Stream `path` back as an attachment. The cleanup guard is moved into the
/// body stream, so the temp tree is removed once the response has been
/// fully sent (or the client disconnected), never before.
async fn attachment_response(
    path: &Path,
    filename: &str,
    content_type: &str,
    cleanup: DirCleanup,
) -> Result<Response, ApiError> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        // Dropping `cleanup` here removes the temp tree.
        Err(err) => return Err(ApiError::BadRequest(err.to_string())),
    };

    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep_until_sent = &cleanup;
        chunk
    });

    let mut response = Body::from_stream(stream).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = content_type.parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }
    let disposition = format!("attachment; filename=\"{filename}\"")
        .parse()
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok(response)
}
