use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::search::SearchResult;

/// 搜索请求参数
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// 查询文本，可以用 and / ve 连接多个搜索意图
    #[serde(default)]
    pub query: String,
    /// 风格提示，目前支持 formal 和 casual
    #[serde(default)]
    pub style: Option<String>,
}

/// 单条搜索结果
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHit {
    /// 图片文件名
    pub filename: String,
    /// 余弦相似度
    pub score: f32,
    /// 匹配到的子查询，仅复合查询返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// 图片地址
    pub url: String,
}

impl From<SearchResult> for SearchHit {
    fn from(result: SearchResult) -> Self {
        Self {
            url: image_url(&result.filename),
            filename: result.filename,
            score: result.score,
            query: result.query_part,
        }
    }
}

/// 上传请求参数
#[derive(TryFromMultipart)]
pub struct UploadRequest {
    #[form_data(limit = "10MiB")]
    pub file: FieldData<Bytes>,
}

/// 上传表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadForm {
    /// 上传的图片文件，支持 png、jpg、jpeg、webp
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// 上传响应
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// 生成的文件名
    pub filename: String,
    /// 图片地址
    pub url: String,
}

/// 图片列表中的一项
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageEntry {
    pub id: usize,
    pub filename: String,
    pub url: String,
}

/// 重建索引的响应
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

/// 返回图片的访问地址
pub fn image_url(filename: &str) -> String {
    format!("/data/{filename}")
}
