//! MD5 digests as published in the version catalogs, and the tee sink used
//! to hash an archive while it is written to disk.

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Length of an MD5 digest in bytes.
pub const MD5_LEN: usize = 16;

/// A 128-bit MD5 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Md5Digest([u8; MD5_LEN]);

/// The expected checksum could not be turned into exactly 16 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumShapeError {
    pub value: String,
}

impl fmt::Display for ChecksumShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checksum {:?} is not a {}-byte MD5 digest",
            self.value, MD5_LEN
        )
    }
}

impl std::error::Error for ChecksumShapeError {}

impl Md5Digest {
    /// Decode a hex digest (either case). Odd lengths, non-hex characters and
    /// lengths other than 32 hex digits are rejected.
    pub fn from_hex(s: &str) -> Result<Self, ChecksumShapeError> {
        let bytes = hex::decode(s).map_err(|_| ChecksumShapeError {
            value: s.to_string(),
        })?;
        Self::from_slice(&bytes).map_err(|_| ChecksumShapeError {
            value: s.to_string(),
        })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ChecksumShapeError> {
        let arr: [u8; MD5_LEN] = bytes.try_into().map_err(|_| ChecksumShapeError {
            value: hex::encode(bytes),
        })?;
        Ok(Md5Digest(arr))
    }

    pub fn as_bytes(&self) -> &[u8; MD5_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Consume a hasher and return its digest.
    pub fn finish(hasher: Md5) -> Self {
        let out = hasher.finalize();
        let mut arr = [0u8; MD5_LEN];
        arr.copy_from_slice(&out);
        Md5Digest(arr)
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the MD5 of a file. Reads in chunks to keep memory use bounded.
pub fn md5_path(path: &Path) -> Result<Md5Digest> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Md5Digest::finish(hasher))
}

/// Sink that forwards every chunk to two writers before accepting the next.
///
/// Both writers see the same bytes in the same order; a chunk is only
/// acknowledged once both have taken all of it.
#[derive(Debug)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}
