use anyhow::Result;
use clap::Parser;

use super::{OutputFormat, open_gallery};
use crate::cli::SubCommandExtend;
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for ListCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let gallery = open_gallery(opts).await?;
        let images = gallery.list_images().await?;
        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&images)?),
            OutputFormat::Table => {
                for (id, name) in images.iter().enumerate() {
                    println!("{id}\t{name}");
                }
            }
        }
        Ok(())
    }
}
