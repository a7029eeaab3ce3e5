//! HTTP inbound adapter.
//!
//! `POST /merge-videos` takes a multipart form (`videos[]` files, optional
//! `intro` and `timestamp` fields) and runs the merge pipeline.
//! `GET /download/:workspace/:file` serves the merged output.

pub mod download;
pub mod merge;

use crate::application::orchestrator::OrchestratorService;
use crate::domain::error::ErrorKind;
use crate::ports::command::CommandRunner;
use crate::ports::storage::StoragePort;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState<S, C> {
    pub orchestrator: Arc<OrchestratorService<S, C>>,
    /// Largest accepted size of a single uploaded video
    pub max_upload_bytes: u64,
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Storage | ErrorKind::Probe | ErrorKind::Encode => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn router<S, C>(state: AppState<S, C>) -> Router
where
    S: StoragePort + 'static,
    C: CommandRunner + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/merge-videos", post(merge::handle::<S, C>))
        .route("/download/:workspace/:file", get(download::handle::<S, C>))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::fs::FsAdapter;
    use crate::application::orchestrator::PipelineSettings;
    use crate::ports::command::{CommandOutput, Tool};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use std::io;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    const BOUNDARY: &str = "splice-test-boundary";

    /// Every clip lasts 2.5 s without audio; every encode writes its output.
    struct StubTools;

    #[async_trait]
    impl CommandRunner for StubTools {
        async fn run(&self, tool: Tool, args: Vec<String>) -> io::Result<CommandOutput> {
            match tool {
                Tool::Inspector if args.contains(&"format=duration".to_string()) => {
                    Ok(CommandOutput::ok("2.500000\n"))
                }
                Tool::Inspector => Ok(CommandOutput::ok("")),
                Tool::Encoder => {
                    let target = args.last().cloned().unwrap_or_default();
                    std::fs::write(Path::new(&target), b"merged video")?;
                    Ok(CommandOutput::ok(""))
                }
            }
        }
    }

    fn app(max_upload_bytes: u64) -> (Router, TempDir) {
        let root = tempdir().unwrap();
        let orchestrator = OrchestratorService::new(
            FsAdapter::new(),
            StubTools,
            PipelineSettings {
                workspace_root: root.path().to_path_buf(),
                font_file: None,
            },
        );
        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            max_upload_bytes,
        };
        (router(state), root)
    }

    enum Part<'a> {
        File {
            name: &'a str,
            file_name: &'a str,
            content_type: &'a str,
            bytes: &'a [u8],
        },
        Text {
            name: &'a str,
            value: &'a str,
        },
    }

    fn multipart(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            name, file_name, content_type
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/merge-videos")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_merge_then_download() {
        let (app, _root) = app(1024);
        let request = multipart(&[
            Part::File {
                name: "videos[]",
                file_name: "one.mp4",
                content_type: "video/mp4",
                bytes: b"first",
            },
            Part::File {
                name: "videos[]",
                file_name: "two.mov",
                content_type: "video/quicktime",
                bytes: b"second",
            },
            Part::Text {
                name: "intro",
                value: "Demo",
            },
            Part::Text {
                name: "timestamp",
                value: "2024-01-01 10:00:00 AM",
            },
        ]);

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Videos processed successfully.");
        let url = body["data"]["download_url"].as_str().unwrap().to_string();
        assert!(url.ends_with("/output.mp4"));

        let download = Request::builder()
            .uri(format!("/download/{}", url))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(download).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"merged video");
    }

    #[tokio::test]
    async fn test_rejects_non_video_upload() {
        let (app, root) = app(1024);
        let request = multipart(&[Part::File {
            name: "videos[]",
            file_name: "notes.txt",
            content_type: "text/plain",
            bytes: b"hello",
        }]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "validation");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_oversized_upload() {
        let (app, _root) = app(4);
        let request = multipart(&[Part::File {
            name: "videos[]",
            file_name: "big.mp4",
            content_type: "video/mp4",
            bytes: b"0123456789",
        }]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("big.mp4"));
    }

    #[tokio::test]
    async fn test_missing_videos_is_validation_error() {
        let (app, _root) = app(1024);
        let request = multipart(&[Part::Text {
            name: "intro",
            value: "Demo",
        }]);

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Video processing failed.");
    }

    #[tokio::test]
    async fn test_download_rejects_unknown_paths() {
        let (app, _root) = app(1024);
        for uri in [
            "/download/not_a_workspace/output.mp4",
            "/download/abcdefghij-1700000000/output.mp4",
            "/download/abcdefghij-1700000000/concat_list.txt",
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::Encode), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
