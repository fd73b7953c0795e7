//! `dockvs resolve [version]` – show the catalog entry a version maps to.

use anyhow::{bail, Result};
use dockvs_core::config::DockvsConfig;
use dockvs_core::pipeline::ServerFetcher;
use dockvs_core::release::{Resolution, VersionToken};

pub fn run_resolve(cfg: &DockvsConfig, version: Option<&str>) -> Result<()> {
    let token = VersionToken::parse(version.unwrap_or_default());
    let fetcher = ServerFetcher::from_config(cfg);
    let resolver = fetcher.resolver();
    let version = resolver.resolve_token(&token)?;
    match resolver.resolve_release(&version) {
        Resolution::Found(release) => {
            println!("version:  {}", version);
            println!("channel:  {}", release.channel);
            println!("file:     {}", release.file);
            println!("md5:      {}", release.md5);
            Ok(())
        }
        Resolution::NotFound => bail!("Invalid version number: {}", version),
    }
}
