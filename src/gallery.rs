use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use tokio::sync::RwLock;
use tokio::task::block_in_place;

use crate::config::ConfDir;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::metrics;
use crate::search::{self, QueryPlan, SearchResult};
use crate::store::EmbeddingStore;
use crate::utils;

pub struct GalleryBuilder {
    conf_dir: ConfDir,
    image_dir: Option<PathBuf>,
    embedder: Arc<dyn Embedder>,
}

impl GalleryBuilder {
    pub fn new(conf_dir: ConfDir, embedder: Arc<dyn Embedder>) -> Self {
        Self { conf_dir, image_dir: None, embedder }
    }

    /// 设置图片目录，默认为配置目录下的 data 目录
    pub fn image_dir(mut self, image_dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(image_dir.into());
        self
    }

    /// 打开图库，需要在多线程运行时中调用
    pub async fn open(self) -> Result<Gallery> {
        let image_dir = self.image_dir.unwrap_or_else(|| self.conf_dir.images());
        let embedder = self.embedder;
        let store = block_in_place(|| EmbeddingStore::open(self.conf_dir, image_dir.clone(), &*embedder))?;
        Ok(Gallery { store: RwLock::new(store), embedder, image_dir })
    }
}

/// 图库
///
/// 向量存储只能通过这里的方法访问，修改与写入快照在同一把写锁内完成。
/// 向量计算是阻塞操作，因此所有方法都需要在多线程运行时中调用。
pub struct Gallery {
    store: RwLock<EmbeddingStore>,
    embedder: Arc<dyn Embedder>,
    image_dir: PathBuf,
}

impl Gallery {
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// 当前索引中的图片数量
    pub async fn len(&self) -> usize {
        self.store.read().await.index().len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.index().is_empty()
    }

    /// 使用文本搜索图片，`style` 为可选的风格提示
    pub async fn search(&self, query: &str, style: Option<&str>) -> Result<Vec<SearchResult>> {
        let plan = QueryPlan::new(query, style)?;
        info!("正在搜索: {plan:?}");

        let start = Instant::now();
        let store = self.store.read().await;
        let results = block_in_place(|| search::search(store.index(), &*self.embedder, &plan));
        drop(store);

        let best = results.first().map(|r| r.score);
        metrics::inc_search(plan.kind(), start.elapsed().as_secs_f32(), best);

        Ok(results)
    }

    /// 保存上传的图片并加入索引，返回生成的文件名
    ///
    /// 任何一步失败都会删除已写入的文件，保证图片与索引一一对应。
    pub async fn add_image(&self, file_name: &str, data: &[u8]) -> Result<String> {
        let Some(ext) = utils::image_extension(file_name) else {
            metrics::inc_upload("unsupported");
            return Err(Error::UnsupportedFormat(file_name.to_string()));
        };

        let (name, path) = loop {
            let name = utils::unique_filename(&ext);
            let path = self.image_dir.join(&name);
            if !tokio::fs::try_exists(&path).await? {
                break (name, path);
            }
        };
        tokio::fs::write(&path, data).await?;

        let vector = match block_in_place(|| self.embedder.embed_image(&path)) {
            Ok(vector) => vector,
            Err(e) => {
                remove_image(&path).await;
                metrics::inc_upload("encoding_error");
                return Err(e.into());
            }
        };

        let mut store = self.store.write().await;
        if let Err(e) = store.add_and_persist(&name, &vector) {
            drop(store);
            remove_image(&path).await;
            metrics::inc_upload("rejected");
            return Err(e);
        }

        info!("已添加图片 {file_name} -> {name}");
        metrics::inc_upload("ok");
        Ok(name)
    }

    /// 列出所有图片，同时清理已被删除的图片
    pub async fn list_images(&self) -> Result<Vec<String>> {
        let mut store = self.store.write().await;
        let removed = store.sync_with_disk()?;
        if removed > 0 {
            info!("已清理 {removed} 条过期记录");
        }
        Ok(store.index().paths().to_vec())
    }

    /// 重新计算所有图片的向量，返回处理的图片数量
    pub async fn reset(&self) -> Result<usize> {
        let mut store = self.store.write().await;
        block_in_place(|| store.reset(&*self.embedder))
    }
}

async fn remove_image(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        error!("删除图片 {} 失败: {e}", path.display());
    }
}
