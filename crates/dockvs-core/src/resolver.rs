//! Turns a version token into a concrete release.
//!
//! Aliases go through the latest-version endpoints. Literals are looked up
//! in the stable catalog first, then the unstable one; catalogs are fetched
//! fresh on every call.

use crate::catalog::CatalogClient;
use crate::config::Endpoints;
use crate::error::FetchError;
use crate::http::{self, HttpOptions};
use crate::release::{Channel, Resolution, ResolvedRelease, VersionToken};

#[derive(Debug, Clone)]
pub struct VersionResolver {
    endpoints: Endpoints,
    http: HttpOptions,
    catalogs: CatalogClient,
}

impl VersionResolver {
    pub fn new(endpoints: Endpoints, http: HttpOptions) -> Self {
        let catalogs = CatalogClient::new(http.clone());
        Self {
            endpoints,
            http,
            catalogs,
        }
    }

    /// Latest published version on `channel`, whitespace-trimmed.
    pub fn resolve_latest(&self, channel: Channel) -> Result<String, FetchError> {
        let url = self.endpoints.latest(channel);
        let body = http::get_bytes(url, &self.http).map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
        let version = String::from_utf8_lossy(&body).trim().to_string();
        tracing::debug!(%channel, %version, "latest version");
        Ok(version)
    }

    /// Look `version` up in the stable catalog, then the unstable one.
    ///
    /// Never fails: an unavailable catalog counts as not containing the
    /// version, so a version only reachable through a broken catalog is
    /// reported as `NotFound`.
    pub fn resolve_release(&self, version: &str) -> Resolution {
        for channel in Channel::SEARCH_ORDER {
            let url = self.endpoints.catalog(channel);
            let catalog = match self.catalogs.fetch(url) {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::debug!(%channel, "skipping catalog: {}", e);
                    continue;
                }
            };
            if let Some(entry) = catalog.server_entry(version) {
                tracing::debug!(%channel, version, file = %entry.file, "release found");
                return Resolution::Found(ResolvedRelease {
                    channel,
                    file: entry.file.clone(),
                    md5: entry.md5.clone(),
                });
            }
        }
        tracing::debug!(version, "release not found");
        Resolution::NotFound
    }

    /// Concrete version string for `token`. Literals pass through untouched.
    pub fn resolve_token(&self, token: &VersionToken) -> Result<String, FetchError> {
        match token {
            VersionToken::Alias(channel) => self.resolve_latest(*channel),
            VersionToken::Literal(v) => Ok(v.clone()),
        }
    }
}
