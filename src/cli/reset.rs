use anyhow::Result;
use clap::Parser;
use log::info;

use super::open_gallery;
use crate::cli::SubCommandExtend;
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct ResetCommand {}

impl SubCommandExtend for ResetCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let gallery = open_gallery(opts).await?;
        let count = gallery.reset().await?;
        info!("重建完成，共处理 {count} 张图片");
        Ok(())
    }
}
