//! Per-instance settings file (`<id>/.dockvs`).
//!
//! A tolerant `key=value` format: blank lines, `#` comments and `[section]`
//! markers are skipped, malformed lines are dropped silently, values may be
//! quoted.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = ".dockvs";

/// Saved choices for one server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSettings {
    /// Version token; empty means "latest stable".
    pub version: String,
    pub port: String,
}

impl InstanceSettings {
    pub fn new(default_port: &str) -> Self {
        Self {
            version: String::new(),
            port: default_port.to_string(),
        }
    }

    pub fn path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE)
    }

    /// Apply recognised keys from `text` over the current values.
    pub fn apply(&mut self, text: &str) {
        for (key, value) in parse_settings(text) {
            match key.as_str() {
                "version" => self.version = value,
                "port" => self.port = value,
                _ => tracing::debug!(key = %key, "ignoring unknown setting"),
            }
        }
    }

    /// Load `dir/.dockvs` over defaults. A missing file leaves the defaults.
    pub fn load(dir: &Path, default_port: &str) -> Result<Self> {
        let mut settings = Self::new(default_port);
        let path = Self::path(dir);
        match fs::read_to_string(&path) {
            Ok(text) => settings.apply(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        }
        Ok(settings)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::path(dir);
        fs::write(&path, self.render()).with_context(|| format!("write {}", path.display()))
    }

    pub fn render(&self) -> String {
        format!("\nversion={}\nport={}\n", self.version, self.port)
    }
}

/// Parse `key=value` lines into pairs, in file order.
pub fn parse_settings(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            let value = value.trim();
            let value = unquote(value).unwrap_or_else(|| value.to_string());
            Some((key.trim().to_string(), value))
        })
        .collect()
}

/// Strip surrounding quotes, Go-literal style.
///
/// Backticks are raw. Double quotes take backslash escapes (`\a \b \f \n
/// \r \t \v \\ \"`, `\xNN`, three-digit octal, `\uNNNN`, `\UNNNNNNNN`).
/// Single quotes hold exactly one character with the same escapes, `\'`
/// in place of `\"`. Returns `None` if `s` is not a well-formed quoted value
/// or does not decode to UTF-8.
fn unquote(s: &str) -> Option<String> {
    let quote = match s.as_bytes().first()? {
        b'`' => '`',
        b'"' => '"',
        b'\'' => '\'',
        _ => return None,
    };
    if s.len() < 2 || !s.ends_with(quote) {
        return None;
    }
    let inner = &s[1..s.len() - 1];
    match quote {
        '`' => (!inner.contains('`')).then(|| inner.to_string()),
        '"' => unescape(inner, quote),
        _ => {
            let value = unescape(inner, quote)?;
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(_), None) => Some(value),
                _ => None,
            }
        }
    }
}

fn unescape(inner: &str, quote: char) -> Option<String> {
    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            return None;
        }
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        let escape = chars.next()?;
        match escape {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' | '\'' if escape == quote => out.push(escape as u8),
            'x' => out.push(hex_digits(&mut chars, 2)? as u8),
            'u' => push_char(&mut out, char::from_u32(hex_digits(&mut chars, 4)?)?),
            'U' => push_char(&mut out, char::from_u32(hex_digits(&mut chars, 8)?)?),
            '0'..='7' => {
                let mut value = escape.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(u8::try_from(value).ok()?);
            }
            _ => return None,
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digits(chars: &mut std::str::Chars<'_>, count: usize) -> Option<u32> {
    (0..count).try_fold(0u32, |acc, _| Some(acc * 16 + chars.next()?.to_digit(16)?))
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}
