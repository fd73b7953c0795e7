//! `dockvs build [version]` – fetch a verified server archive and build its image.

use anyhow::{Context, Result};
use dockvs_core::config::DockvsConfig;
use dockvs_core::pipeline::ServerFetcher;
use dockvs_core::release::VersionToken;
use std::fs;

use crate::cli::container::{self, ContainerTool};

pub fn run_build(cfg: &DockvsConfig, version: Option<&str>, tool: &dyn ContainerTool) -> Result<()> {
    fs::create_dir_all(&cfg.staging_dir)
        .with_context(|| format!("create {}", cfg.staging_dir.display()))?;

    let token = VersionToken::parse(version.unwrap_or_default());
    let archive = cfg.archive_path();
    let fetched = ServerFetcher::from_config(cfg).fetch(&token, &archive)?;
    println!(
        "Downloaded {} ({}, {} bytes, md5 {})",
        fetched.version, fetched.release.channel, fetched.report.bytes, fetched.report.digest
    );

    container::write_dockerfile(&cfg.staging_dir)?;
    let tag = cfg.image_tag(&fetched.version);
    tool.run(&container::build_image_args(&tag, &cfg.staging_dir))?;
    println!("Built image {}", tag);
    Ok(())
}
