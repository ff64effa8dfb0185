use anyhow::Result;
use clap::Parser;

use super::{OutputFormat, open_gallery};
use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::search::SearchResult;

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    /// 查询文本，可以用 and / ve 连接多个搜索意图
    pub query: String,
    /// 风格提示，目前支持 formal 和 casual
    #[arg(long)]
    pub style: Option<String>,
    /// 输出格式
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let gallery = open_gallery(opts).await?;
        let result = gallery.search(&self.query, self.style.as_deref()).await?;
        print_result(&result, self.output_format)
    }
}

fn print_result(result: &[SearchResult], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for item in result {
                match &item.query_part {
                    Some(part) => println!("{:.4}\t{}\t{}", item.score, item.filename, part),
                    None => println!("{:.4}\t{}", item.score, item.filename),
                }
            }
        }
    }
    Ok(())
}
