use std::collections::HashSet;
use std::path::Path;

use indicatif::ProgressStyle;
use rand::distr::{Alphanumeric, SampleString};
use walkdir::WalkDir;

/// 允许的图片后缀名，不区分大小写
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// 返回文件名的小写后缀，后缀不在允许范围内时返回 None
pub fn image_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// 生成一个随机文件名，保留原始后缀
pub fn unique_filename(ext: &str) -> String {
    let stem = Alphanumeric.sample_string(&mut rand::rng(), 32).to_ascii_lowercase();
    format!("{stem}.{ext}")
}

/// 列出目录第一层的所有文件名
pub fn list_files(dir: &Path) -> HashSet<String> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

/// 列出目录第一层的所有图片文件名，按名称排序
pub fn list_images(dir: &Path) -> Vec<String> {
    let mut files = list_files(dir)
        .into_iter()
        .filter(|name| image_extension(name).is_some())
        .collect::<Vec<_>>();
    files.sort_unstable();
    files
}

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
    )
    .expect("invalid progress bar template")
    .progress_chars("##-")
}
