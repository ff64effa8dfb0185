use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "codress", "codress").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().expect("config dir is not valid utf-8")
}

#[derive(Parser, Debug, Clone)]
pub struct EmbedderOptions {
    /// 嵌入服务地址，需要提供 /embed/text 和 /embed/image 两个接口
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8001")]
    pub embedder_url: String,
    /// 嵌入服务请求超时时间，单位为秒
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub embedder_timeout: u64,
}

impl EmbedderOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.embedder_timeout)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "codress", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// codress 配置目录，向量快照保存在此处
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
    /// 图片目录，默认为配置目录下的 data 目录
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    #[command(flatten)]
    pub embedder: EmbedderOptions,
}

impl Opts {
    /// 返回实际使用的图片目录
    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| self.conf_dir.images())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 启动 HTTP 搜索服务
    Server(ServerCommand),
    /// 使用文本搜索图片
    Search(SearchCommand),
    /// 添加图片到图库
    Add(AddCommand),
    /// 列出图库中的图片，同时清理已被删除的图片
    List(ListCommand),
    /// 删除向量快照，并根据图片目录重新计算
    Reset(ResetCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回向量快照文件的路径
    pub fn snapshot(&self) -> PathBuf {
        self.path.join("embeddings.json")
    }

    /// 返回向量快照的临时路径，写入完成后再重命名
    pub fn snapshot_tmp(&self) -> PathBuf {
        self.path.join("embeddings.json.tmp")
    }

    /// 返回默认图片目录
    pub fn images(&self) -> PathBuf {
        self.path.join("data")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

