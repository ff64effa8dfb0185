#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use codress::config::ConfDir;
use codress::embedder::{EmbedError, Embedder};
use codress::{Gallery, GalleryBuilder};

/// 测试用的嵌入服务
///
/// 图片文件的内容即为向量，如 `1,0`；内容为 `corrupt` 时视为无法解码。
/// 文本向量需要事先通过 [`FakeEmbedder::text`] 注册。
#[derive(Default)]
pub struct FakeEmbedder {
    texts: HashMap<String, Vec<f32>>,
    pub image_calls: AtomicUsize,
    pub text_calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: &str, vector: &[f32]) -> Self {
        self.texts.insert(text.to_string(), vector.to_vec());
        self
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }
}

impl Embedder for FakeEmbedder {
    fn embed_image(&self, path: &Path) -> Result<Vec<f32>, EmbedError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        let encoding_error = |reason: &str| EmbedError::Encoding {
            path: path.display().to_string(),
            reason: reason.to_string(),
        };
        let content = std::fs::read_to_string(path).map_err(|e| encoding_error(&e.to_string()))?;
        content
            .trim()
            .split(',')
            .map(|x| x.trim().parse::<f32>().map_err(|_| encoding_error("not an image")))
            .collect()
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        self.texts
            .get(text)
            .cloned()
            .ok_or_else(|| EmbedError::Unavailable(format!("unknown text {text:?}")))
    }
}

/// 写入一张"图片"，内容为向量
pub fn write_image(dir: &Path, name: &str, vector: &[f32]) {
    let content = vector.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(",");
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
}

pub fn unit(angle: f32) -> Vec<f32> {
    vec![angle.cos(), angle.sin()]
}

pub async fn open_gallery(conf_dir: &Path, embedder: Arc<FakeEmbedder>) -> Gallery {
    GalleryBuilder::new(ConfDir::new(conf_dir), embedder).open().await.unwrap()
}
