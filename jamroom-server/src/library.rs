use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json,
};
use jamroom_core::MUSIC_PATH;
use log::info;
use tower_http::services::ServeDir;

use crate::{
    config::ServerConfig,
    context::ServerContext,
    errors::{ServerError, ServerResult},
    serialized::{ToSerialized, Track},
    Router,
};

/// Room for the multipart framing around the file itself
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

#[utoipa::path(
    get,
    path = "/api/music",
    tag = "music",
    responses(
        (status = 200, body = Vec<Track>, description = "Every stored track, sorted by file name")
    )
)]
pub async fn list_tracks(State(context): State<ServerContext>) -> ServerResult<Json<Vec<Track>>> {
    let tracks = context.collab.library.list().await?;

    Ok(Json(tracks.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "music",
    request_body(content = UploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = Track, description = "The stored track, possibly renamed"),
        (status = 400, body = ErrorBody, description = "The file type or name is not allowed"),
        (status = 413, body = ErrorBody, description = "The file is too large")
    )
)]
pub async fn upload(
    State(context): State<ServerContext>,
    mut multipart: Multipart,
) -> ServerResult<Json<Track>> {
    let max = context.config.max_upload_bytes;
    let library = &context.collab.library;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|f| f.to_string())
            .ok_or_else(|| ServerError::Validation("The file has no name".to_string()))?;

        // Refuse unwanted types before reading the body
        library.policy().check(&filename, 0)?;

        let data = field.bytes().await.map_err(|e| multipart_error(e, max))?;
        let track = library.store(&filename, &data).await?;

        info!("Uploaded {}", track.filename);
        return Ok(Json(track.to_serialized()));
    }

    Err(ServerError::Validation(
        "Expected a multipart field named file".to_string(),
    ))
}

fn multipart_error(error: MultipartError, max: u64) -> ServerError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge { max }
    } else {
        ServerError::Validation(error.body_text())
    }
}

pub fn router(config: &ServerConfig) -> Router {
    let body_limit = config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
        .try_into()
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/music", get(list_tracks))
        .route(
            "/api/upload",
            post(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .nest_service(MUSIC_PATH, ServeDir::new(&config.music_dir))
}

#[cfg(test)]
mod test {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{context::ServerContext, router, ServerConfig};

    const BOUNDARY: &str = "jamroom-boundary";

    fn create_app(max_upload_bytes: u64) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();

        let config = ServerConfig {
            music_dir: dir.path().to_path_buf(),
            max_upload_bytes,
            ..Default::default()
        };

        (dir, router(ServerContext::new(config)))
    }

    fn upload_request(filename: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn uploaded_tracks_are_listed_and_served() {
        let (_dir, app) = create_app(1024);

        let (status, body) = send(&app, upload_request("Song.mp3", b"ID3 audio")).await;
        assert_eq!(status, StatusCode::OK);

        let track: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(track["filename"], "Song.mp3");
        assert_eq!(track["url"], "/music/Song.mp3");

        let list = Request::get("/api/music").body(Body::empty()).unwrap();
        let (_, body) = send(&app, list).await;
        let tracks: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(tracks[0]["name"], "Song");
        assert_eq!(tracks[0]["size"], 9);

        let stream = Request::get("/music/Song.mp3").body(Body::empty()).unwrap();
        let (status, body) = send(&app, stream).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ID3 audio");
    }

    #[tokio::test]
    async fn disallowed_files_are_rejected_and_not_written() {
        let (dir, app) = create_app(1024);

        let (status, body) = send(&app, upload_request("malware.exe", b"MZ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "validation");

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn oversized_files_are_rejected() {
        let (dir, app) = create_app(16);

        let (status, _) = send(&app, upload_request("long.mp3", &[0; 64])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        assert!(!dir.path().join("long.mp3").exists());
    }

    #[tokio::test]
    async fn huge_upload_limits_are_capped() {
        let (_dir, app) = create_app(u64::MAX);

        let (status, _) = send(&app, upload_request("small.mp3", b"ID3")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_tracks_are_not_served() {
        let (_dir, app) = create_app(1024);

        let stream = Request::get("/music/missing.mp3")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, stream).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
