use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::http::HttpOptions;
use crate::release::Channel;

/// Placeholders substituted into `Endpoints::download_template`.
pub const CHANNEL_PLACEHOLDER: &str = "{channel}";
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Remote endpoints. Defaults point at the public Vintage Story API;
/// tests and mirrors override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Plain-text latest stable version.
    pub latest_stable: String,
    /// Plain-text latest unstable version.
    pub latest_unstable: String,
    /// JSON catalog of stable releases.
    pub catalog_stable: String,
    /// JSON catalog of unstable releases.
    pub catalog_unstable: String,
    /// Archive URL with `{channel}` and `{file}` placeholders.
    pub download_template: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            latest_stable: "http://api.vintagestory.at/lateststable.txt".to_string(),
            latest_unstable: "http://api.vintagestory.at/latestunstable.txt".to_string(),
            catalog_stable: "http://api.vintagestory.at/stable.json".to_string(),
            catalog_unstable: "http://api.vintagestory.at/unstable.json".to_string(),
            download_template: "https://account.vintagestory.at/files/{channel}/{file}"
                .to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint rooted at `base` (e.g. a local test server).
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            latest_stable: format!("{base}/lateststable.txt"),
            latest_unstable: format!("{base}/latestunstable.txt"),
            catalog_stable: format!("{base}/stable.json"),
            catalog_unstable: format!("{base}/unstable.json"),
            download_template: format!("{base}/files/{{channel}}/{{file}}"),
        }
    }

    pub fn latest(&self, channel: Channel) -> &str {
        match channel {
            Channel::Stable => &self.latest_stable,
            Channel::Unstable => &self.latest_unstable,
        }
    }

    pub fn catalog(&self, channel: Channel) -> &str {
        match channel {
            Channel::Stable => &self.catalog_stable,
            Channel::Unstable => &self.catalog_unstable,
        }
    }

    /// Check that every endpoint is an absolute URL and the template carries
    /// both placeholders.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("latest_stable", &self.latest_stable),
            ("latest_unstable", &self.latest_unstable),
            ("catalog_stable", &self.catalog_stable),
            ("catalog_unstable", &self.catalog_unstable),
        ] {
            url::Url::parse(value).with_context(|| format!("endpoints.{name}: {value:?}"))?;
        }
        let template = &self.download_template;
        if !template.contains(CHANNEL_PLACEHOLDER) || !template.contains(FILE_PLACEHOLDER) {
            bail!(
                "endpoints.download_template must contain {} and {}: {:?}",
                CHANNEL_PLACEHOLDER,
                FILE_PLACEHOLDER,
                template
            );
        }
        let sample = template
            .replace(CHANNEL_PLACEHOLDER, "stable")
            .replace(FILE_PLACEHOLDER, "server.tar.gz");
        url::Url::parse(&sample)
            .with_context(|| format!("endpoints.download_template: {template:?}"))?;
        Ok(())
    }
}

/// Global configuration loaded from `~/.config/dockvs/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockvsConfig {
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Directory the archive and Dockerfile are staged in before `docker build`.
    pub staging_dir: PathBuf,
    /// Name of the archive inside `staging_dir`.
    pub archive_name: String,
    /// Image tag prefix; the lowercased version is appended.
    pub image_prefix: String,
    /// Host port used by `launch` when none is saved or given.
    pub default_port: String,
    /// Optional connect timeout in seconds (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for DockvsConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            staging_dir: PathBuf::from(".dockvs-build"),
            archive_name: "server.tar.gz".to_string(),
            image_prefix: "vs-".to_string(),
            default_port: "42420".to_string(),
            connect_timeout_secs: None,
        }
    }
}

impl DockvsConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            ..HttpOptions::default()
        }
    }

    pub fn archive_path(&self) -> PathBuf {
        self.staging_dir.join(&self.archive_name)
    }

    /// Image tag for a resolved version, e.g. `vs-1.17.0-rc.2`.
    pub fn image_tag(&self, version: &str) -> String {
        format!("{}{}", self.image_prefix, version.to_lowercase())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dockvs")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DockvsConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DockvsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DockvsConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.endpoints.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DockvsConfig::default();
        assert_eq!(cfg.staging_dir, PathBuf::from(".dockvs-build"));
        assert_eq!(cfg.archive_path(), PathBuf::from(".dockvs-build/server.tar.gz"));
        assert_eq!(cfg.default_port, "42420");
        assert!(cfg.connect_timeout_secs.is_none());
        cfg.endpoints.validate().unwrap();
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DockvsConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DockvsConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.endpoints, cfg.endpoints);
        assert_eq!(parsed.staging_dir, cfg.staging_dir);
        assert_eq!(parsed.image_prefix, cfg.image_prefix);
    }

    #[test]
    fn config_toml_custom_endpoints() {
        let toml = r#"
            staging_dir = "/tmp/vs-build"
            archive_name = "server.tar.gz"
            image_prefix = "vintage-"
            default_port = "40000"
            connect_timeout_secs = 10

            [endpoints]
            latest_stable = "http://mirror.local/lateststable.txt"
            latest_unstable = "http://mirror.local/latestunstable.txt"
            catalog_stable = "http://mirror.local/stable.json"
            catalog_unstable = "http://mirror.local/unstable.json"
            download_template = "http://mirror.local/{channel}/{file}"
        "#;
        let cfg: DockvsConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.endpoints.catalog(Channel::Unstable), "http://mirror.local/unstable.json");
        assert_eq!(cfg.http_options().connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(cfg.image_tag("1.17.0-RC.2"), "vintage-1.17.0-rc.2");
        cfg.endpoints.validate().unwrap();
    }

    #[test]
    fn missing_endpoints_section_uses_defaults() {
        let toml = r#"
            staging_dir = ".dockvs-build"
            archive_name = "server.tar.gz"
            image_prefix = "vs-"
            default_port = "42420"
        "#;
        let cfg: DockvsConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.endpoints, Endpoints::default());
    }

    #[test]
    fn template_without_placeholders_rejected() {
        let mut endpoints = Endpoints::default();
        endpoints.download_template = "https://example.com/files/{file}".to_string();
        assert!(endpoints.validate().is_err());
    }

    #[test]
    fn relative_endpoint_rejected() {
        let mut endpoints = Endpoints::default();
        endpoints.catalog_stable = "stable.json".to_string();
        assert!(endpoints.validate().is_err());
    }

    #[test]
    fn with_base_builds_all_endpoints() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:8080/");
        assert_eq!(endpoints.latest(Channel::Stable), "http://127.0.0.1:8080/lateststable.txt");
        assert_eq!(
            endpoints.download_template,
            "http://127.0.0.1:8080/files/{channel}/{file}"
        );
        endpoints.validate().unwrap();
    }
}
