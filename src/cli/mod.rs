mod add;
mod list;
mod reset;
mod search;
mod server;

use std::sync::Arc;

pub use add::*;
pub use list::*;
pub use reset::*;
pub use search::*;
pub use server::*;

use clap::ValueEnum;

use crate::config::Opts;
use crate::embedder::HttpEmbedder;
use crate::{Gallery, GalleryBuilder};

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

/// 根据命令行参数打开图库
pub async fn open_gallery(opts: &Opts) -> anyhow::Result<Gallery> {
    let embedder = Arc::new(HttpEmbedder::from(&opts.embedder));
    let gallery = GalleryBuilder::new(opts.conf_dir.clone(), embedder)
        .image_dir(opts.image_dir())
        .open()
        .await?;
    Ok(gallery)
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}
