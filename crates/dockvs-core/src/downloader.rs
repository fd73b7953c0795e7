//! Verified archive download.
//!
//! The response body is streamed once through a [`Tee`] into the destination
//! file and an MD5 hasher, then the digest is compared with the catalog's.
//! Nothing is buffered whole and nothing is retried.
//!
//! The destination is only created (or truncated) once the server has
//! answered 2xx and delivered the first chunk, so a failed request leaves
//! an existing file as it was. Once writing has started, a failure leaves
//! whatever was written; callers must not trust it.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use md5::{Digest, Md5};

use crate::checksum::{Md5Digest, Tee};
use crate::config::{CHANNEL_PLACEHOLDER, FILE_PLACEHOLDER};
use crate::error::FetchError;
use crate::http::{self, HttpOptions, StreamError};
use crate::release::{Channel, ResolvedRelease};

/// Summary of a verified download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub bytes: u64,
    pub digest: Md5Digest,
}

#[derive(Debug, Clone)]
pub struct VerifiedDownloader {
    template: String,
    http: HttpOptions,
}

impl VerifiedDownloader {
    /// `template` must contain `{channel}` and `{file}`.
    pub fn new(template: impl Into<String>, http: HttpOptions) -> Self {
        Self {
            template: template.into(),
            http,
        }
    }

    pub fn download_url(&self, channel: Channel, file: &str) -> String {
        self.template
            .replace(CHANNEL_PLACEHOLDER, channel.as_str())
            .replace(FILE_PLACEHOLDER, file)
    }

    /// Download with a hex expected checksum. The checksum is validated
    /// before any request is made.
    pub fn download(
        &self,
        channel: Channel,
        file: &str,
        expected_md5: &str,
        dest: &Path,
    ) -> Result<DownloadReport, FetchError> {
        let expected = Md5Digest::from_hex(expected_md5)?;
        self.download_verified(channel, file, &expected, dest)
    }

    /// Download a catalog release, checking its published checksum first.
    pub fn download_release(
        &self,
        release: &ResolvedRelease,
        dest: &Path,
    ) -> Result<DownloadReport, FetchError> {
        let expected = release.checksum()?;
        self.download_verified(release.channel, &release.file, &expected, dest)
    }

    /// Stream the archive into `dest` while hashing it, then require the
    /// digest to equal `expected`. `dest` is created or truncated on the
    /// first body chunk of a successful response.
    pub fn download_verified(
        &self,
        channel: Channel,
        file: &str,
        expected: &Md5Digest,
        dest: &Path,
    ) -> Result<DownloadReport, FetchError> {
        let url = self.download_url(channel, file);
        tracing::info!(%url, dest = %dest.display(), "downloading server archive");

        let mut tee = Tee::new(LazyFile::new(dest), Md5::new());
        let bytes = http::get_streaming(&url, &self.http, &mut tee).map_err(|e| match e {
            StreamError::Transport(source) => FetchError::DownloadTransport {
                url: url.clone(),
                source,
            },
            StreamError::Sink(source) => FetchError::Write {
                path: dest.to_path_buf(),
                source,
            },
        })?;
        let (out, hasher) = tee.into_inner();
        // An empty 2xx body still yields an (empty) archive on disk.
        out.finish().map_err(|source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        })?;

        let actual = Md5Digest::finish(hasher);
        tracing::debug!(bytes, expected = %expected, actual = %actual, "archive hashed");
        if actual != *expected {
            return Err(FetchError::ChecksumMismatch {
                path: dest.to_path_buf(),
                expected: *expected,
                actual,
            });
        }
        tracing::info!(bytes, md5 = %actual, "archive verified");
        Ok(DownloadReport {
            bytes,
            digest: actual,
        })
    }
}

/// File sink that is opened on the first write.
struct LazyFile<'a> {
    path: &'a Path,
    file: Option<File>,
}

impl<'a> LazyFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, file: None }
    }

    fn open(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => File::create(self.path)?,
        };
        Ok(self.file.insert(file))
    }

    /// Create the file if nothing was written, then flush and close it.
    fn finish(mut self) -> io::Result<()> {
        self.open()?.flush()
    }
}

impl Write for LazyFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.open()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
