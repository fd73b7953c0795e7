//! Remote version catalogs.
//!
//! A catalog maps a literal version string to per-role asset metadata. Only
//! the `server` role matters here; other roles and unknown fields are
//! carried through decoding and ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::FetchError;
use crate::http::{self, HttpOptions};

/// Asset role consulted during resolution.
pub const SERVER_ROLE: &str = "server";

/// One downloadable asset of a version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Remote archive filename, substituted into the download template.
    #[serde(rename = "filename")]
    pub file: String,
    /// Published MD5 as hex; shape is checked when the entry is used.
    pub md5: String,
}

/// Decoded catalog: version -> role -> entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    versions: BTreeMap<String, BTreeMap<String, CatalogEntry>>,
}

impl Catalog {
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    /// The `server` entry of `version`. A version without one counts as absent.
    pub fn server_entry(&self, version: &str) -> Option<&CatalogEntry> {
        self.versions.get(version)?.get(SERVER_ROLE)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Fetches catalogs over HTTP. One request per call, no retries.
#[derive(Debug, Clone, Default)]
pub struct CatalogClient {
    http: HttpOptions,
}

impl CatalogClient {
    pub fn new(http: HttpOptions) -> Self {
        Self { http }
    }

    /// GET and decode the catalog at `url`. Transport and decode failures both
    /// come back as `CatalogUnavailable`.
    pub fn fetch(&self, url: &str) -> Result<Catalog, FetchError> {
        let body = http::get_bytes(url, &self.http).map_err(|e| FetchError::CatalogUnavailable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let catalog = Catalog::from_json(&body).map_err(|e| FetchError::CatalogUnavailable {
            url: url.to_string(),
            reason: format!("invalid catalog: {}", e),
        })?;
        tracing::debug!(url, versions = catalog.len(), "catalog loaded");
        Ok(catalog)
    }
}
