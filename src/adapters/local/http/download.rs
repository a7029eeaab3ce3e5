use super::AppState;
use crate::domain::workspace::{WorkspaceId, OUTPUT_FILE};
use crate::ports::command::CommandRunner;
use crate::ports::storage::StoragePort;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Streams `output.mp4` out of a workspace. Anything else is a 404.
pub async fn handle<S, C>(
    State(state): State<AppState<S, C>>,
    Path((workspace, file)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)>
where
    S: StoragePort + 'static,
    C: CommandRunner + 'static,
{
    let not_found = || (StatusCode::NOT_FOUND, "Not found".to_string());

    if WorkspaceId::parse(&workspace).is_none() || file != OUTPUT_FILE {
        return Err(not_found());
    }

    let path = state
        .orchestrator
        .settings()
        .workspace_root
        .join(&workspace)
        .join(OUTPUT_FILE);
    let file = File::open(&path).await.map_err(|e| {
        debug!(path = %path.display(), error = %e, "download miss");
        not_found()
    })?;

    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"output.mp4\"",
            ),
        ],
        body,
    )
        .into_response())
}
