pub mod cli;
pub mod config;
pub mod embedder;
mod error;
pub mod gallery;
mod metrics;
pub mod search;
pub mod server;
pub mod store;
pub mod utils;

pub use config::Opts;
pub use error::{Error, Result};
pub use gallery::{Gallery, GalleryBuilder};
