use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// 可以识别的风格，其余风格不会改写查询
pub const STYLES: [&str; 2] = ["formal", "casual"];

/// 英语和土耳其语的连接词
static CONJUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:and|ve)\s+").expect("failed to build regex"));

/// 查询计划
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// 只有一个搜索意图
    Simple(String),
    /// 由连接词拆分出的多个搜索意图，按原始顺序排列
    Compound(Vec<String>),
}

impl QueryPlan {
    /// 根据查询文本和可选的风格生成查询计划
    ///
    /// 拆分只是简单的正则匹配，不支持引号或转义。
    pub fn new(query: &str, style: Option<&str>) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let augmented = augment(query, style);
        let lowered = augmented.to_lowercase();
        let pieces = CONJUNCTION.split(&lowered).collect::<Vec<_>>();
        let mut parts = pieces
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();

        match parts.len() {
            0 => Err(Error::EmptyQuery),
            1 if pieces.len() == 1 => Ok(Self::Simple(augmented.trim().to_owned())),
            1 => Ok(Self::Simple(parts.remove(0))),
            _ => Ok(Self::Compound(parts)),
        }
    }

    /// 需要计算向量的文本
    pub fn parts(&self) -> &[String] {
        match self {
            Self::Simple(text) => std::slice::from_ref(text),
            Self::Compound(parts) => parts.as_slice(),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Compound(_) => "compound",
        }
    }
}

/// 在查询前加上风格提示，未知风格保持原样
pub fn augment(query: &str, style: Option<&str>) -> String {
    match style.map(|s| s.trim().to_lowercase()) {
        Some(style) if STYLES.contains(&style.as_str()) => format!("{style} style {query}"),
        _ => query.to_owned(),
    }
}
