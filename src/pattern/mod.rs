//! Tag patterns
//!
//! A pattern string carries its type as a prefix:
//! - `glob:v1.*` - shell-style wildcard matching, ranked by creation time
//! - `semver:>=1.2.0 <2.0.0` - semantic version constraints, ranked by version
//!
//! The prefix may be omitted, in which case the pattern is a glob. `semver:*` matches only
//! tags that are valid versions, while `glob:*` matches every tag.

pub mod error;
pub mod glob;
pub mod semver;

use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::image::NewerFn;

pub use self::error::PatternError;
pub use self::glob::{GlobEngine, GlobPattern, ShellGlob};
pub use self::semver::{
    ConstraintSet, SemverPattern, SemverScheme, VersionScheme, parse_version,
};

pub const GLOB_PREFIX: &str = "glob:";
pub const SEMVER_PREFIX: &str = "semver:";

/// Matches every tag
pub static PATTERN_ALL: Lazy<Pattern> = Lazy::new(|| Pattern::new("glob:*"));

/// Matches only the `latest` tag
pub static PATTERN_LATEST: Lazy<Pattern> = Lazy::new(|| Pattern::new("glob:latest"));

/// Behavior shared by every pattern type
pub trait TagMatcher: Send + Sync {
    /// Returns true if `tag` matches this pattern
    fn matches(&self, tag: &str) -> bool;

    /// Returns the ordering function used to rank matching tags, newest first
    fn image_newer_fn(&self) -> NewerFn;

    /// Returns false if the pattern could not be fully parsed
    fn is_valid(&self) -> bool;
}

/// A parsed tag pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Glob(GlobPattern),
    Semver(SemverPattern),
}

impl Pattern {
    /// Parse a pattern according to its prefix. Never fails: a malformed semver
    /// expression yields a pattern that reports itself invalid through [`Pattern::is_valid`].
    pub fn new(raw: &str) -> Self {
        match raw.strip_prefix(SEMVER_PREFIX) {
            Some(expression) => Pattern::Semver(SemverPattern::new(expression)),
            None => Pattern::Glob(GlobPattern::new(
                raw.strip_prefix(GLOB_PREFIX).unwrap_or(raw),
            )),
        }
    }

    /// Parse a pattern, failing on a malformed semver expression
    pub fn try_new(raw: &str) -> Result<Self, PatternError> {
        match raw.strip_prefix(SEMVER_PREFIX) {
            Some(expression) => SemverPattern::try_new(expression).map(Pattern::Semver),
            None => Ok(Pattern::new(raw)),
        }
    }

    fn inner(&self) -> &dyn TagMatcher {
        match self {
            Pattern::Glob(glob) => glob,
            Pattern::Semver(semver) => semver,
        }
    }
}

impl TagMatcher for Pattern {
    fn matches(&self, tag: &str) -> bool {
        self.inner().matches(tag)
    }

    fn image_newer_fn(&self) -> NewerFn {
        self.inner().image_newer_fn()
    }

    fn is_valid(&self) -> bool {
        self.inner().is_valid()
    }
}

impl Default for Pattern {
    fn default() -> Self {
        PATTERN_ALL.clone()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Glob(glob) => glob.fmt(f),
            Pattern::Semver(semver) => semver.fmt(f),
        }
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::try_new(s)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Pattern::new(&raw))
    }
}
