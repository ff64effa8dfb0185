mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;
pub use self::types::*;

#[derive(OpenApi)]
#[openapi(
    paths(api::search_handler, api::upload_handler, api::list_images_handler, api::reset_handler),
    components(schemas(types::UploadForm))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    let images = ServeDir::new(state.gallery.image_dir());

    Router::new()
        .route("/api/search", post(api::search_handler))
        .route("/search", post(api::search_handler))
        .route("/api/upload", post(api::upload_handler))
        .route("/upload", post(api::upload_handler))
        .route("/api/images", get(api::list_images_handler))
        .route("/api/reset", post(api::reset_handler))
        .nest_service("/data", images)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(api::not_found_handler)
        .layer(DefaultBodyLimit::disable())
        // 上传限制：10M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 10))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
