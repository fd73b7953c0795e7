//! Version tokens, channels and resolution results.

use std::fmt;

use crate::checksum::Md5Digest;
use crate::error::FetchError;

/// Release track. Each has its own latest-version endpoint, catalog and
/// download directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stable,
    Unstable,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Unstable => "unstable",
        }
    }

    /// Lookup order for literal versions: stable wins ties.
    pub const SEARCH_ORDER: [Channel; 2] = [Channel::Stable, Channel::Unstable];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-supplied version: one of the reserved aliases or an opaque literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    Alias(Channel),
    Literal(String),
}

impl VersionToken {
    /// `"stable"`, `"unstable"` and the empty string (nothing chosen) are
    /// aliases; anything else is a literal lookup key.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "stable" => VersionToken::Alias(Channel::Stable),
            "unstable" => VersionToken::Alias(Channel::Unstable),
            other => VersionToken::Literal(other.to_string()),
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionToken::Alias(channel) => f.write_str(channel.as_str()),
            VersionToken::Literal(v) => f.write_str(v),
        }
    }
}

/// A concrete, downloadable release found in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub channel: Channel,
    pub file: String,
    /// MD5 exactly as published.
    pub md5: String,
}

impl ResolvedRelease {
    /// Decoded expected digest; a malformed published value is an error here,
    /// before anything is downloaded.
    pub fn checksum(&self) -> Result<Md5Digest, FetchError> {
        Ok(Md5Digest::from_hex(&self.md5)?)
    }
}

/// Outcome of looking a literal version up across the catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedRelease),
    NotFound,
}

impl Resolution {
    pub fn found(self) -> Option<ResolvedRelease> {
        match self {
            Resolution::Found(release) => Some(release),
            Resolution::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_parse_to_channels() {
        assert_eq!(VersionToken::parse("stable"), VersionToken::Alias(Channel::Stable));
        assert_eq!(
            VersionToken::parse("unstable"),
            VersionToken::Alias(Channel::Unstable)
        );
        assert_eq!(VersionToken::parse(""), VersionToken::Alias(Channel::Stable));
    }

    #[test]
    fn literals_are_opaque() {
        assert_eq!(
            VersionToken::parse("1.17.0-rc.2"),
            VersionToken::Literal("1.17.0-rc.2".to_string())
        );
        assert_eq!(
            VersionToken::parse("Stable"),
            VersionToken::Literal("Stable".to_string())
        );
    }

    #[test]
    fn channel_names() {
        assert_eq!(Channel::Stable.to_string(), "stable");
        assert_eq!(Channel::Unstable.as_str(), "unstable");
        assert_eq!(Channel::SEARCH_ORDER[0], Channel::Stable);
    }

    #[test]
    fn release_checksum_decodes() {
        let release = ResolvedRelease {
            channel: Channel::Stable,
            file: "vs_server_1.17.0.tar.gz".to_string(),
            md5: "5d41402abc4b2a76b9719d911017c592".to_string(),
        };
        assert_eq!(
            release.checksum().unwrap().to_hex(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn release_checksum_rejects_bad_shape() {
        let release = ResolvedRelease {
            channel: Channel::Unstable,
            file: "x.tar.gz".to_string(),
            md5: "5d41".to_string(),
        };
        assert!(matches!(release.checksum(), Err(FetchError::ChecksumShape(_))));
    }

    #[test]
    fn resolution_accessors() {
        assert!(Resolution::NotFound.found().is_none());
    }
}
