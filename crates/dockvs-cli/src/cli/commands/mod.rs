//! CLI command handlers, one per file.

mod build;
mod checksum;
mod launch;
mod resolve;

pub use build::run_build;
pub use checksum::run_checksum;
pub use launch::run_launch;
pub use resolve::run_resolve;
