//! 文本搜索图片
//!
//! 查询先经过 [`QueryPlan`] 拆分为一个或多个子查询，逐个计算文本向量后，
//! 再与索引中的图片向量比较相似度。

mod planner;
mod ranker;

use log::{debug, error, warn};

pub use self::planner::*;
pub use self::ranker::*;
use crate::embedder::Embedder;
use crate::store::EmbeddingIndex;

/// 执行一次搜索
///
/// 索引为空、索引状态异常或嵌入服务失败时返回空列表，不会报错。
pub fn search(index: &EmbeddingIndex, embedder: &dyn Embedder, plan: &QueryPlan) -> Vec<SearchResult> {
    if let Err(e) = index.check_consistency() {
        error!("放弃搜索: {e}");
        return vec![];
    }
    if index.is_empty() {
        debug!("索引为空，跳过搜索");
        return vec![];
    }

    match plan {
        QueryPlan::Simple(text) => match embed_query(embedder, text) {
            Some(query) => rank_simple(index, &query),
            None => vec![],
        },
        QueryPlan::Compound(parts) => {
            debug!("复合查询: {parts:?}");
            let queries = parts
                .iter()
                .filter_map(|part| embed_query(embedder, part).map(|query| (part.as_str(), query)))
                .collect::<Vec<_>>();
            rank_compound(index, &queries)
        }
    }
}

fn embed_query(embedder: &dyn Embedder, text: &str) -> Option<Vec<f32>> {
    match embedder.embed_text(text) {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!("无法计算查询 {text:?} 的向量: {e}");
            None
        }
    }
}
