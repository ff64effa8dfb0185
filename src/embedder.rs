//! 嵌入服务
//!
//! 图片和文本的向量由外部的 CLIP 类模型计算，这里只定义调用接口。
//! 两种向量必须位于同一个嵌入空间，且经过 L2 归一化，这样点积即为余弦相似度。

use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EmbedderOptions;

#[derive(Debug, Error)]
pub enum EmbedError {
    /// 图片无法读取或解码
    #[error("无法编码图片 {path}: {reason}")]
    Encoding { path: String, reason: String },
    #[error("嵌入服务不可用: {0}")]
    Unavailable(String),
    #[error("嵌入服务返回了无效的响应: {0}")]
    InvalidResponse(String),
}

/// 向量计算接口
pub trait Embedder: Send + Sync {
    /// 计算一张图片的向量
    fn embed_image(&self, path: &Path) -> Result<Vec<f32>, EmbedError>;

    /// 计算一段文本的向量
    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// 将向量归一化为单位长度，零向量原样返回
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0. {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    vector
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// 通过 HTTP 调用的嵌入服务
///
/// * `POST {url}/embed/text`，请求体为 `{"text": "..."}`
/// * `POST {url}/embed/image`，请求体为图片原始字节
///
/// 两者均返回 `{"embedding": [...]}`。
pub struct HttpEmbedder {
    agent: ureq::Agent,
    url: String,
}

impl HttpEmbedder {
    pub fn new(url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, url: url.trim_end_matches('/').to_string() }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/embed/{}", self.url, name)
    }
}

impl From<&EmbedderOptions> for HttpEmbedder {
    fn from(opts: &EmbedderOptions) -> Self {
        Self::new(&opts.embedder_url, opts.timeout())
    }
}

impl Embedder for HttpEmbedder {
    fn embed_image(&self, path: &Path) -> Result<Vec<f32>, EmbedError> {
        let encoding_error = |reason: String| EmbedError::Encoding {
            path: path.display().to_string(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| encoding_error(e.to_string()))?;
        debug!("计算图片向量: {} ({} 字节)", path.display(), data.len());

        let response = self
            .agent
            .post(&self.endpoint("image"))
            .set("Content-Type", "application/octet-stream")
            .send_bytes(&data);

        match response {
            Ok(response) => read_embedding(response),
            // 4xx 说明服务端无法解码这张图片
            Err(ureq::Error::Status(code, response)) if (400..500).contains(&code) => {
                let body = response.into_string().unwrap_or_default();
                Err(encoding_error(format!("HTTP {code}: {body}")))
            }
            Err(e) => Err(EmbedError::Unavailable(e.to_string())),
        }
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        debug!("计算文本向量: {text:?}");
        let response = self.agent.post(&self.endpoint("text")).send_json(TextRequest { text });

        match response {
            Ok(response) => read_embedding(response),
            Err(e) => Err(EmbedError::Unavailable(e.to_string())),
        }
    }
}

fn read_embedding(response: ureq::Response) -> Result<Vec<f32>, EmbedError> {
    let body: EmbeddingResponse =
        response.into_json().map_err(|e| EmbedError::InvalidResponse(e.to_string()))?;
    if body.embedding.is_empty() {
        return Err(EmbedError::InvalidResponse("向量为空".to_string()));
    }
    Ok(l2_normalize(body.embedding))
}
