//! Serves catalog images over HTTP.
//!
//! Mount at `/images`:
//!   GET /images/:filename  — the raw image file

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::{path::PathBuf, sync::Arc};
use tokio::fs;
use tracing::{debug, warn};

use crate::mime_detect::{detect_mime_type, is_inline_safe};

/// State shared by image routes.
#[derive(Clone)]
pub struct ImageServerState {
    pub images_dir: Arc<PathBuf>,
}

/// Build the image router.
pub fn image_router(images_dir: PathBuf) -> Router {
    let state = ImageServerState {
        images_dir: Arc::new(images_dir),
    };
    Router::new()
        .route("/:filename", get(serve_image))
        .with_state(state)
}

/// A single path component that is neither `.` nor `..`.
fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\'])
        && std::path::Path::new(name).file_name() == Some(std::ffi::OsStr::new(name))
}

async fn serve_image(
    Path(filename): Path<String>,
    State(state): State<ImageServerState>,
) -> Response {
    if !is_plain_file_name(&filename) {
        warn!(filename = %filename, "Rejected suspicious image path");
        return (StatusCode::BAD_REQUEST, "Invalid filename").into_response();
    }

    let path = state.images_dir.join(&filename);
    debug!(path = %path.display(), "Serving image");

    match fs::read(&path).await {
        Ok(bytes) => {
            let mime = detect_mime_type(&path);
            let disposition = if is_inline_safe(mime) {
                format!("inline; filename=\"{filename}\"")
            } else {
                format!("attachment; filename=\"{filename}\"")
            };

            let mut response = (StatusCode::OK, bytes).into_response();
            let headers = response.headers_mut();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
            if let Ok(value) = HeaderValue::from_str(&disposition) {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            response
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "Image not found").into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read image file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read image").into_response()
        }
    }
}
