use thiserror::Error;

use crate::embedder::EmbedError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 图库相关的错误
#[derive(Debug, Error)]
pub enum Error {
    /// 快照结构校验失败，加载时会被丢弃
    #[error("向量快照已损坏: {0}")]
    CorruptSnapshot(String),
    /// 新向量的维度与索引不一致
    #[error("向量维度不一致：索引为 {expected}，新向量为 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("图片已存在于索引中: {0}")]
    DuplicatePath(String),
    /// 路径数量与向量数量不一致
    #[error("索引状态异常：{paths} 个路径，{vectors} 个向量")]
    IndexInconsistency { paths: usize, vectors: usize },
    #[error("查询内容不能为空")]
    EmptyQuery,
    #[error("缺少必要字段: {0}")]
    MissingField(&'static str),
    #[error("不支持的文件类型: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Encoding(#[from] EmbedError),
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 是否为调用方的输入错误
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::MissingField(_) | Self::UnsupportedFormat(_))
    }
}
