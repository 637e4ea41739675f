//! Release version comparison.
//!
//! Versions are compared numerically per `major.minor.patch` segment, so
//! `1.9.0 < 1.16.0`. Anything after a `-` or `+` (e.g. `-SNAPSHOT`) is ignored.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid version: {0}")]
pub struct ParseVersionError(pub String);

/// A `major.minor.patch` release version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemanticVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `1`, `1.16` or `1.16.0`, with missing segments treated as 0.
    pub fn parse(version: &str) -> Result<Self, ParseVersionError> {
        let invalid = || ParseVersionError(version.to_string());

        let core = version
            .trim()
            .split(['-', '+'])
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;

        let mut segments = [0u32; 3];
        let mut count = 0;
        for part in core.split('.') {
            if count == segments.len() {
                return Err(invalid());
            }
            segments[count] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }

        let [major, minor, patch] = segments;
        Ok(Self::new(major, minor, patch))
    }

    /// True when `self` is the same release as `other` or a later one.
    pub fn is_at_least(&self, other: &SemanticVersion) -> bool {
        self >= other
    }
}

impl FromStr for SemanticVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
