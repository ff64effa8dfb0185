use std::collections::HashSet;

use log::warn;
use ndarray::Array1;
use serde::Serialize;

use crate::store::EmbeddingIndex;

/// 相似度阈值，低于该值的结果会被丢弃
pub const MIN_SIMILARITY_THRESHOLD: f32 = 0.2;
/// 简单查询保留的候选数量
pub const SIMPLE_TOP_K: usize = 2;
/// 复合查询中每个子查询保留的候选数量
pub const COMPOUND_TOP_K: usize = 3;
/// 复合查询合并后的最大结果数量
pub const COMPOUND_MAX_RESULTS: usize = 2;

/// 搜索结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// 图片文件名
    pub filename: String,
    /// 余弦相似度
    pub score: f32,
    /// 匹配到的子查询，仅复合查询有该字段
    #[serde(rename = "query", skip_serializing_if = "Option::is_none")]
    pub query_part: Option<String>,
}

/// 返回相似度最高的 k 个下标，相似度相同时先出现的优先
pub fn top_k(similarities: &Array1<f32>, k: usize) -> Vec<usize> {
    let mut order = (0..similarities.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| similarities[b].total_cmp(&similarities[a]));
    order.truncate(k);
    order
}

/// 取出前 k 个不低于阈值的候选，查询向量维度不对时返回 None
fn candidates(
    index: &EmbeddingIndex,
    query: &[f32],
    k: usize,
    part: Option<&str>,
) -> Option<Vec<SearchResult>> {
    let similarities = match index.similarities(query) {
        Ok(similarities) => similarities,
        Err(e) => {
            warn!("无法比较查询向量: {e}");
            return None;
        }
    };

    let results = top_k(&similarities, k.min(index.len()))
        .into_iter()
        .filter(|&i| similarities[i] >= MIN_SIMILARITY_THRESHOLD)
        .map(|i| SearchResult {
            filename: index.paths()[i].clone(),
            score: similarities[i],
            query_part: part.map(str::to_owned),
        })
        .collect();
    Some(results)
}

/// 简单查询：取前 2 个结果
pub fn rank_simple(index: &EmbeddingIndex, query: &[f32]) -> Vec<SearchResult> {
    candidates(index, query, SIMPLE_TOP_K, None).unwrap_or_default()
}

/// 复合查询：每个子查询取前 3 个结果，合并去重后保留前 2 个
///
/// `queries` 为 `(子查询, 查询向量)`，按拆分顺序排列。
pub fn rank_compound(index: &EmbeddingIndex, queries: &[(&str, Vec<f32>)]) -> Vec<SearchResult> {
    let mut results = queries
        .iter()
        .filter_map(|(part, query)| candidates(index, query, COMPOUND_TOP_K, Some(*part)))
        .flatten()
        .collect::<Vec<_>>();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut seen = HashSet::new();
    results.retain(|result| seen.insert(result.filename.clone()));
    results.truncate(COMPOUND_MAX_RESULTS);
    results
}
