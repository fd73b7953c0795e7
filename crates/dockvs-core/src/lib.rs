pub mod config;
pub mod logging;

pub mod catalog;
pub mod checksum;
pub mod downloader;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod release;
pub mod resolver;
pub mod settings;

pub use error::FetchError;
