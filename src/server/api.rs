use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_typed_multipart::TypedMultipart;
use log::info;
use serde_json::{Value, json};

use super::error::Result;
use super::state::AppState;
use super::types::*;
use crate::Error;

/// 使用文本搜索图片
#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    responses(
        (status = 200, body = [SearchHit]),
        (status = 400, description = "查询内容为空"),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<SearchRequest>,
) -> Result<Json<Vec<SearchHit>>> {
    let results = state.gallery.search(&data.query, data.style.as_deref()).await?;
    Ok(Json(results.into_iter().map(SearchHit::from).collect()))
}

/// 上传一张图片
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UploadResponse),
        (status = 400, description = "文件名为空或文件类型不支持"),
        (status = 500, description = "无法计算图片向量"),
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let file_name = match data.file.metadata.file_name.as_deref() {
        Some(file_name) if !file_name.is_empty() => file_name,
        _ => return Err(Error::MissingField("file").into()),
    };

    info!("正在处理上传图片: {file_name}");
    let filename = state.gallery.add_image(file_name, &data.file.contents).await?;

    Ok(Json(UploadResponse { success: true, url: image_url(&filename), filename }))
}

/// 列出所有图片
#[utoipa::path(
    get,
    path = "/api/images",
    responses(
        (status = 200, body = [ImageEntry]),
    )
)]
pub async fn list_images_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ImageEntry>>> {
    let images = state.gallery.list_images().await?;
    Ok(Json(
        images
            .into_iter()
            .enumerate()
            .map(|(id, filename)| ImageEntry { id, url: image_url(&filename), filename })
            .collect(),
    ))
}

/// 删除向量快照并重新计算所有图片的向量
#[utoipa::path(
    post,
    path = "/api/reset",
    responses(
        (status = 200, body = ResetResponse),
    )
)]
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ResetResponse>> {
    let count = state.gallery.reset().await?;
    Ok(Json(ResetResponse {
        success: true,
        message: format!("Reset complete. Processed {count} images."),
    }))
}

pub async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found. Please check the API documentation at /docs."
        })),
    )
}
