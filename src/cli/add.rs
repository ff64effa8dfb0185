use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use indicatif::ProgressBar;
use log::error;

use super::open_gallery;
use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// 需要添加的图片，支持 png、jpg、jpeg、webp
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl SubCommandExtend for AddCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let gallery = open_gallery(opts).await?;

        let pb = ProgressBar::new(self.files.len() as u64).with_style(pb_style());
        let mut failed = 0;

        for file in &self.files {
            let file_name = file.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            let result = match tokio::fs::read(file).await {
                Ok(data) => gallery.add_image(&file_name, &data).await.map_err(anyhow::Error::from),
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(name) => {
                    pb.println(format!("{}\t{}", file.display(), name));
                    pb.set_message(name);
                }
                Err(e) => {
                    error!("添加图片失败 {}: {e}", file.display());
                    failed += 1;
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("图片添加完成");

        if failed > 0 {
            bail!("{failed} 张图片添加失败");
        }
        Ok(())
    }
}
