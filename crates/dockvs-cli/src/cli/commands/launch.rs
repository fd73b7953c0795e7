//! `dockvs launch <id> [version [port]]` – start a server container.

use anyhow::{bail, Context, Result};
use dockvs_core::config::DockvsConfig;
use dockvs_core::pipeline::ServerFetcher;
use dockvs_core::release::VersionToken;
use dockvs_core::settings::InstanceSettings;
use dockvs_core::FetchError;
use std::fs;
use std::path::Path;

use crate::cli::container::{self, ContainerTool};

/// `base_dir` holds the instance directories (the working directory).
pub fn run_launch(
    cfg: &DockvsConfig,
    base_dir: &Path,
    id: &str,
    version: Option<&str>,
    port: Option<&str>,
    tool: &dyn ContainerTool,
) -> Result<()> {
    container::validate_instance_id(id)?;
    let data_dir = base_dir.join(id);
    fs::create_dir_all(&data_dir).with_context(|| format!("create {}", data_dir.display()))?;

    let mut settings = InstanceSettings::load(&data_dir, &cfg.default_port)?;
    if let Some(version) = version {
        settings.version = version.to_string();
        if let Some(port) = port {
            settings.port = port.to_string();
        }
        settings.save(&data_dir)?;
    }
    container::validate_port(&settings.port)?;

    // An empty saved version means latest stable; the image must already exist.
    let token = VersionToken::parse(&settings.version);
    let version = match ServerFetcher::from_config(cfg).validate(&token) {
        Ok(version) => version,
        Err(FetchError::VersionNotFound(v)) => bail!("Invalid version number: {}", v),
        Err(e) => return Err(e.into()),
    };

    let image = cfg.image_tag(&version);
    tool.run(&container::run_container_args(
        id,
        &data_dir,
        &settings.port,
        &image,
    ))?;
    tracing::info!(id, %image, port = %settings.port, "container started");
    Ok(())
}
