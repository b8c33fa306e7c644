//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{DeleteResponse, FileInfoResponse, UploadResponse, UploadedFileResponse};
use super::error::ErrorBody;
use super::handlers::{
    self, delete_file, download_file, get_file_info, list_files, upload_file, view_file, AppState,
    UploadForm,
};
use super::middleware::create_cors_layer;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// OpenAPI document for the file API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Filebox API",
        description = "Upload, list, download and delete files stored on the local filesystem"
    ),
    paths(
        handlers::file::upload_file,
        handlers::file::list_files,
        handlers::file::get_file_info,
        handlers::file::download_file,
        handlers::file::view_file,
        handlers::file::delete_file,
    ),
    components(schemas(
        UploadForm,
        UploadResponse,
        UploadedFileResponse,
        FileInfoResponse,
        DeleteResponse,
        ErrorBody
    )),
    tags(
        (name = "files", description = "File storage endpoints")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/files", get(list_files))
        .route("/files/:filename", delete(delete_file))
        .route("/files/:filename/info", get(get_file_info))
        .route("/download/:filename", get(download_file))
        .route("/view/:filename", get(view_file));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

/// Create a router serving the static frontend as the fallback.
///
/// `/` resolves to `index.html` in `static_path`. Returns `None` if the
/// directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    if !Path::new(static_path).is_dir() {
        tracing::warn!(
            "Static directory {} not found; frontend will not be served",
            static_path
        );
        return None;
    }

    Some(Router::new().fallback_service(ServeDir::new(static_path)))
}
