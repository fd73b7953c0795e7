//! Resolve-then-verified-fetch of a server archive.

use std::path::Path;

use crate::config::DockvsConfig;
use crate::downloader::{DownloadReport, VerifiedDownloader};
use crate::error::FetchError;
use crate::release::{Resolution, ResolvedRelease, VersionToken};
use crate::resolver::VersionResolver;

/// A verified archive on disk and the version it was resolved to.
#[derive(Debug, Clone)]
pub struct FetchedServer {
    /// Concrete version; used to tag the container image.
    pub version: String,
    pub release: ResolvedRelease,
    pub report: DownloadReport,
}

#[derive(Debug, Clone)]
pub struct ServerFetcher {
    resolver: VersionResolver,
    downloader: VerifiedDownloader,
}

impl ServerFetcher {
    pub fn new(resolver: VersionResolver, downloader: VerifiedDownloader) -> Self {
        Self {
            resolver,
            downloader,
        }
    }

    pub fn from_config(cfg: &DockvsConfig) -> Self {
        let http = cfg.http_options();
        let resolver = VersionResolver::new(cfg.endpoints.clone(), http.clone());
        let downloader = VerifiedDownloader::new(cfg.endpoints.download_template.clone(), http);
        Self::new(resolver, downloader)
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// Resolve `token` to a catalog release, failing with `VersionNotFound`
    /// when no catalog lists it.
    pub fn locate(&self, token: &VersionToken) -> Result<(String, ResolvedRelease), FetchError> {
        let version = self.resolver.resolve_token(token)?;
        match self.resolver.resolve_release(&version) {
            Resolution::Found(release) => Ok((version, release)),
            Resolution::NotFound => Err(FetchError::VersionNotFound(version)),
        }
    }

    /// Resolve `token`, then download and verify its archive into `dest`.
    pub fn fetch(&self, token: &VersionToken, dest: &Path) -> Result<FetchedServer, FetchError> {
        let (version, release) = self.locate(token)?;
        let report = self.downloader.download_release(&release, dest)?;
        Ok(FetchedServer {
            version,
            release,
            report,
        })
    }

    /// Concrete version for `token` without downloading anything. Aliases are
    /// trusted as published; literals must appear in a catalog.
    pub fn validate(&self, token: &VersionToken) -> Result<String, FetchError> {
        match token {
            VersionToken::Alias(_) => self.resolver.resolve_token(token),
            VersionToken::Literal(_) => self.locate(token).map(|(version, _)| version),
        }
    }
}
