use std::sync::Arc;

use crate::Gallery;

/// 应用状态
pub struct AppState {
    /// 图库
    pub gallery: Gallery,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(gallery: Gallery) -> Arc<Self> {
        Arc::new(AppState { gallery })
    }
}
