//! Router assembly and the HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use crate::api::{self, AppState};

/// Largest accepted request body, uploads included.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the Axum router with all API routes and the `/images` file router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let images_dir = state.service.catalog().dir().to_path_buf();

    Router::new()
        .route("/", get(api::root))
        .route("/api/images", get(api::list_images))
        .route("/api/images/next", get(api::next_image))
        .route("/api/ocr", post(api::recognize_upload))
        .route("/api/ocr/file", post(api::recognize_file))
        .route("/api/save", post(api::save_label))
        .route("/api/labels", get(api::list_labels))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .nest("/images", media::image_router(images_dir))
}

/// CORS policy for the browser front end.
///
/// A `*` entry allows any origin without credentials; otherwise the listed
/// origins are allowed with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Serve the API until the process is stopped.
#[instrument(skip(state, cors_origins))]
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    cors_origins: &[String],
) -> Result<()> {
    let app = build_router(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http());

    info!("HTTP API listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
