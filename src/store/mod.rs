mod index;
mod snapshot;

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rayon::prelude::*;

pub use self::index::EmbeddingIndex;
pub use self::snapshot::{Snapshot, read_snapshot, write_snapshot};
use crate::config::ConfDir;
use crate::embedder::Embedder;
use crate::error::{Error, Result};
use crate::utils;

/// 与图片目录保持同步的向量存储
pub struct EmbeddingStore {
    conf_dir: ConfDir,
    image_dir: PathBuf,
    index: EmbeddingIndex,
}

impl EmbeddingStore {
    /// 打开存储
    ///
    /// 快照有效时直接加载，否则根据图片目录重新计算所有向量。
    pub fn open(conf_dir: ConfDir, image_dir: PathBuf, embedder: &dyn Embedder) -> Result<Self> {
        std::fs::create_dir_all(conf_dir.path())?;
        std::fs::create_dir_all(&image_dir)?;

        let snapshot = conf_dir.snapshot();
        let mut dirty = false;
        let index = match Self::try_load(&snapshot, &image_dir) {
            Ok((index, removed)) => {
                info!("已加载 {} 个图片向量", index.len());
                dirty = removed > 0;
                index
            }
            Err(err) => {
                if !matches!(&err, Error::Io(e) if e.kind() == ErrorKind::NotFound) {
                    warn!("{err}，将重新生成");
                    discard_snapshot(&snapshot);
                }
                info!("正在从 {} 生成图片向量", image_dir.display());
                Self::rebuild(&image_dir, embedder)
            }
        };

        let store = Self { conf_dir, image_dir, index };
        if dirty || (!store.index.is_empty() && !snapshot.exists()) {
            store.persist()?;
        }
        Ok(store)
    }

    /// 加载快照并剔除文件已不存在的记录
    ///
    /// 快照缺失或损坏时返回空索引，损坏的快照文件会被删除。
    pub fn load(snapshot: &Path, image_dir: &Path) -> EmbeddingIndex {
        match Self::try_load(snapshot, image_dir) {
            Ok((index, _)) => index,
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => EmbeddingIndex::empty(),
            Err(err) => {
                warn!("{err}，已丢弃");
                discard_snapshot(snapshot);
                EmbeddingIndex::empty()
            }
        }
    }

    fn try_load(snapshot: &Path, image_dir: &Path) -> Result<(EmbeddingIndex, usize)> {
        let mut index = read_snapshot(snapshot)?;
        let removed = index.retain(|path| {
            let exists = image_dir.join(path).is_file();
            if !exists {
                warn!("图片已不存在，移除过期记录: {path}");
            }
            exists
        });
        if removed > 0 {
            info!("共移除 {removed} 条过期记录");
        }
        Ok((index, removed))
    }

    /// 扫描图片目录并重新计算所有向量
    ///
    /// 单张图片失败只会跳过该图片。
    pub fn rebuild(image_dir: &Path, embedder: &dyn Embedder) -> EmbeddingIndex {
        let files = utils::list_images(image_dir);
        let vectors = files
            .par_iter()
            .map(|name| match embedder.embed_image(&image_dir.join(name)) {
                Ok(vector) => Some(vector),
                Err(e) => {
                    warn!("跳过图片 {name}: {e}");
                    None
                }
            })
            .collect::<Vec<_>>();

        let mut index = EmbeddingIndex::empty();
        for (name, vector) in files.into_iter().zip(vectors) {
            let Some(vector) = vector else {
                continue;
            };
            if let Err(e) = index.push(name.as_str(), &vector) {
                warn!("跳过图片 {name}: {e}");
            }
        }

        if index.is_empty() {
            info!("没有找到可用的图片");
        } else {
            info!("成功处理 {} 张图片", index.len());
        }
        index
    }

    /// 将当前索引写入快照
    pub fn persist(&self) -> Result<()> {
        write_snapshot(&self.index, &self.conf_dir.snapshot(), &self.conf_dir.snapshot_tmp())
    }

    /// 追加一条记录，不会写入快照
    pub fn add(&mut self, filename: &str, vector: &[f32]) -> Result<()> {
        self.index.push(filename, vector)
    }

    /// 追加一条记录并立即写入快照，写入失败时撤销追加
    pub fn add_and_persist(&mut self, filename: &str, vector: &[f32]) -> Result<()> {
        self.add(filename, vector)?;
        if let Err(e) = self.persist() {
            error!("写入快照失败，撤销添加 {filename}: {e}");
            self.index.retain(|path| path != filename);
            return Err(e);
        }
        Ok(())
    }

    /// 只保留 `live` 中存在的记录，返回被移除的数量
    pub fn remove_stale(&mut self, live: &HashSet<String>) -> usize {
        self.index.retain(|path| {
            let alive = live.contains(path);
            if !alive {
                warn!("图片已不存在，移除过期记录: {path}");
            }
            alive
        })
    }

    /// 与图片目录同步，有记录被移除时写入快照
    pub fn sync_with_disk(&mut self) -> Result<usize> {
        let removed = self.remove_stale(&utils::list_files(&self.image_dir));
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// 删除快照并重新计算所有向量，返回处理的图片数量
    pub fn reset(&mut self, embedder: &dyn Embedder) -> Result<usize> {
        match std::fs::remove_file(self.conf_dir.snapshot()) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        self.index = Self::rebuild(&self.image_dir, embedder);
        if !self.index.is_empty() {
            self.persist()?;
        }
        Ok(self.index.len())
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn conf_dir(&self) -> &ConfDir {
        &self.conf_dir
    }
}

fn discard_snapshot(snapshot: &Path) {
    if let Err(e) = std::fs::remove_file(snapshot) {
        if e.kind() != ErrorKind::NotFound {
            error!("删除快照 {} 失败: {e}", snapshot.display());
        }
    }
}
