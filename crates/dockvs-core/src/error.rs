//! Failure kinds of the resolve-then-download pipeline.
//!
//! Every variant is a distinct, reportable condition. Nothing here is
//! retried; callers decide how to present them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::checksum::{ChecksumShapeError, Md5Digest};
use crate::http::TransportError;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Latest-version lookup could not obtain a body.
    #[error("failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// Catalog fetch or decode failed. The resolver treats this as absence.
    #[error("catalog {url} unavailable: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    #[error("version {0:?} not found in any catalog")]
    VersionNotFound(String),

    #[error(transparent)]
    ChecksumShape(#[from] ChecksumShapeError),

    /// Archive GET failed; whatever was written so far stays on disk.
    #[error("download of {url} failed: {source}")]
    DownloadTransport {
        url: String,
        #[source]
        source: TransportError,
    },

    /// Creating or writing the local archive failed.
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive on disk does not match the catalog and must not be used.
    #[error("MD5 mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: Md5Digest,
        actual: Md5Digest,
    },
}
