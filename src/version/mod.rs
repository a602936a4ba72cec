//! Release version strings.
//!
//! The version is interpolated into a directory name and an archive name, so it
//! is checked against an allow-list before any path is built from it.

use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Longest accepted version string
pub const MAX_VERSION_LEN: usize = 64;

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]*$").expect("version regex is valid")
});

/// A version string that is safe to embed in file names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion(String);

impl ReleaseVersion {
    /// Validate and wrap a raw version string
    pub fn parse(input: &str) -> Result<Self> {
        let reject = |reason: &str| {
            Err(ReleaseError::InvalidVersion {
                version: input.to_string(),
                reason: reason.to_string(),
            })
        };

        if input.is_empty() {
            return reject("version must not be empty");
        }
        if input.len() > MAX_VERSION_LEN {
            return reject(&format!("longer than {MAX_VERSION_LEN} characters"));
        }
        if input.contains("..") {
            return reject("'..' is not allowed");
        }
        if !VERSION_RE.is_match(input) {
            return reject("only letters, digits, '.' and '-' are allowed, starting with a letter or digit");
        }

        Ok(Self(input.to_string()))
    }

    /// The validated string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ReleaseVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
