use super::{status_for, AppState};
use crate::domain::error::ErrorKind;
use crate::domain::jobs::{MergeRequest, Upload};
use crate::ports::command::CommandRunner;
use crate::ports::storage::StoragePort;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    BoxError, Json,
};
use futures::{Stream, TryStreamExt};
use serde::Serialize;
use std::io;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::StreamReader;
use tracing::warn;

const ACCEPTED_TYPES: [&str; 5] = [
    "video/mp4",
    "video/avi",
    "video/x-msvideo",
    "video/quicktime",
    "video/mov",
];
const ACCEPTED_EXTENSIONS: [&str; 3] = ["mp4", "avi", "mov"];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MergeData {
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MergeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

type Failure = (StatusCode, Json<MergeResponse>);

fn failure(kind: ErrorKind, error: impl Into<String>) -> Failure {
    (
        status_for(kind),
        Json(MergeResponse {
            success: false,
            message: "Video processing failed.".to_string(),
            data: None,
            error: Some(error.into()),
            kind: Some(kind),
        }),
    )
}

fn is_accepted_video(content_type: Option<&str>, file_name: &str) -> bool {
    match content_type {
        Some(ct) if ct != "application/octet-stream" => ACCEPTED_TYPES
            .iter()
            .any(|accepted| ct.eq_ignore_ascii_case(accepted)),
        _ => Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| ext.eq_ignore_ascii_case(a)))
            .unwrap_or(false),
    }
}

// Handler that accepts the multipart form, stages every video in a scratch
// directory and hands the request to the pipeline.
pub async fn handle<S, C>(
    State(state): State<AppState<S, C>>,
    mut multipart: Multipart,
) -> Result<Json<MergeResponse>, Failure>
where
    S: StoragePort + 'static,
    C: CommandRunner + 'static,
{
    let staging = tempfile::tempdir().map_err(|e| failure(ErrorKind::Storage, e.to_string()))?;
    let mut request = MergeRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| failure(ErrorKind::Validation, e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name.starts_with("videos") {
            let index = request.uploads.len() + 1;
            let file_name = field
                .file_name()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("video_{}.mp4", index));
            if !is_accepted_video(field.content_type(), &file_name) {
                return Err(failure(
                    ErrorKind::Validation,
                    format!("{} is not an accepted video type", file_name),
                ));
            }

            let path = staging.path().join(format!("upload_{}", index));
            let written = stream_to_file(&path, field, state.max_upload_bytes)
                .await
                .map_err(|e| failure(ErrorKind::Storage, e.to_string()))?;
            if written > state.max_upload_bytes {
                return Err(failure(
                    ErrorKind::Validation,
                    format!(
                        "{} exceeds the {} byte upload limit",
                        file_name, state.max_upload_bytes
                    ),
                ));
            }
            request.uploads.push(Upload::new(file_name, path));
        } else if name == "intro" || name == "timestamp" {
            let value = field
                .text()
                .await
                .map_err(|e| failure(ErrorKind::Validation, e.body_text()))?;
            if name == "intro" {
                request.intro = Some(value);
            } else {
                request.started_at = Some(value);
            }
        } else {
            warn!(field = %name, "ignoring unknown form field");
        }
    }

    match state.orchestrator.handle_merge(request).await {
        Ok(output) => Ok(Json(MergeResponse {
            success: true,
            message: "Videos processed successfully.".to_string(),
            data: Some(MergeData {
                download_url: output.download_path,
            }),
            error: None,
            kind: None,
        })),
        Err(e) => Err(failure(e.kind(), e.to_string())),
    }
}

/// Save a `Stream` to a file, copying at most `limit + 1` bytes so the
/// caller can tell an oversized upload apart. Returns the bytes written.
async fn stream_to_file<S, E>(path: &Path, stream: S, limit: u64) -> io::Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);
    let mut limited = body_reader.take(limit.saturating_add(1));

    let mut file = BufWriter::new(File::create(path).await?);
    let written = tokio::io::copy(&mut limited, &mut file).await?;
    tokio::io::AsyncWriteExt::flush(&mut file).await?;

    Ok(written)
}
