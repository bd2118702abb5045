//! # API REST
//!
//! REST API for CENAD file storage.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (multipart uploads, upload limits, download headers, CORS)
//!
//! Storage itself lives in `cenad_files`; this crate only maps HTTP onto it.

#![warn(rust_2018_idioms)]

pub mod error;
mod handlers;
pub mod limits;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{delete, get},
    Router,
};
use cenad_files::FilesService;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

pub use limits::UploadLimits;

/// Room for multipart boundaries and part headers on top of the file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers.
/// Cloning is cheap: the service shares its configuration through an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub files: FilesService,
    pub limits: UploadLimits,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        handlers::delete_tenant,
        handlers::list_category,
        handlers::upload_category,
        handlers::delete_category,
        handlers::get_category_entry,
        handlers::upload_resource,
        handlers::delete_category_entry,
        handlers::download_resource_file,
        handlers::delete_resource_file,
    ),
    components(schemas(
        HealthRes,
        error::ErrorRes,
        handlers::FileInfo,
        handlers::ListFilesRes,
        handlers::UploadRes,
        handlers::FailedUpload,
        handlers::DeleteFileRes,
        handlers::MessageRes,
        handlers::UploadForm,
    ))
)]
struct ApiDoc;

/// Builds the REST router over the given state.
///
/// Request bodies are capped just above the largest category limit; the
/// per-category limit is checked by the upload handlers.
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .limits
        .largest()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi))
        .route("/api/files/:tenant", delete(handlers::delete_tenant))
        .route(
            "/api/files/:tenant/:category",
            get(handlers::list_category)
                .post(handlers::upload_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/files/:tenant/:category/:segment",
            get(handlers::get_category_entry)
                .post(handlers::upload_resource)
                .delete(handlers::delete_category_entry),
        )
        .route(
            "/api/files/:tenant/:category/:segment/:name",
            get(handlers::download_resource_file).delete(handlers::delete_resource_file),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "CENAD files REST API is alive".into(),
    })
}

/// Serves the generated OpenAPI document.
async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
