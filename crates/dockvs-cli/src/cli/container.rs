//! Docker build context and container tool invocation.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Port the server listens on inside the container.
pub const GAME_PORT: u16 = 42420;

/// Image definition staged next to `server.tar.gz`.
pub const DOCKERFILE: &str = r#"
FROM mono:latest
WORKDIR /app
ADD server.tar.gz bin
RUN mkdir data

EXPOSE 42420
CMD ["mono", "./bin/VintagestoryServer.exe", "--dataPath", "./data"]
"#;

/// Runs the external container tool.
pub trait ContainerTool {
    fn run(&self, args: &[String]) -> Result<()>;
}

/// The `docker` binary on `PATH`, with output passed straight through.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
        }
    }
}

impl ContainerTool for DockerCli {
    fn run(&self, args: &[String]) -> Result<()> {
        tracing::info!(program = %self.program, ?args, "running container tool");
        let status = Command::new(&self.program)
            .args(args)
            .status()
            .with_context(|| format!("failed to run {}", self.program))?;
        if !status.success() {
            bail!("{} {} failed: {}", self.program, args.join(" "), status);
        }
        Ok(())
    }
}

/// Write the Dockerfile into the staging directory.
pub fn write_dockerfile(staging_dir: &Path) -> Result<()> {
    let path = staging_dir.join("Dockerfile");
    fs::write(&path, DOCKERFILE).with_context(|| format!("write {}", path.display()))
}

pub fn build_image_args(tag: &str, context_dir: &Path) -> Vec<String> {
    vec![
        "build".to_string(),
        "-t".to_string(),
        tag.to_string(),
        context_dir.display().to_string(),
    ]
}

pub fn run_container_args(id: &str, data_dir: &Path, port: &str, image: &str) -> Vec<String> {
    vec![
        "run".to_string(),
        "-d".to_string(),
        "-it".to_string(),
        "--mount".to_string(),
        format!("type=bind,source={},target=/app/data", data_dir.display()),
        "--restart".to_string(),
        "on-failure".to_string(),
        "-p".to_string(),
        format!("{}:{}", port, GAME_PORT),
        "--name".to_string(),
        id.to_string(),
        image.to_string(),
    ]
}

/// Instance ids double as directory and container names: `[A-Za-z0-9][A-Za-z0-9_.-]*`.
pub fn validate_instance_id(id: &str) -> Result<()> {
    let mut chars = id.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        }
        _ => false,
    };
    if !valid {
        bail!("invalid instance id {:?}: use letters, digits, '_', '.' or '-'", id);
    }
    Ok(())
}

pub fn validate_port(port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(p) if p != 0 => Ok(p),
        _ => bail!("invalid port {:?}", port),
    }
}
