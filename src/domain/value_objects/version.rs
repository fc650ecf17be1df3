//! Version value objects
//!
//! A `Version` is an opaque token. Ordering and increment rules live in the
//! active [`VersioningSystem`](crate::domain::versioning::VersioningSystem),
//! so the token itself only offers equality.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Wrap a token without validating it.
    ///
    /// Callers handling external input go through
    /// `VersioningSystem::parse_query` or `is_valid` first.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What a caller asked for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionQuery {
    /// No version given: resolve to the latest one
    Unspecified,
    /// A prefix the versioning system knows how to match (a major number)
    Partial(String),
    /// A fully pinned version
    Exact(Version),
}

impl VersionQuery {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, VersionQuery::Unspecified)
    }
}

impl fmt::Display for VersionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionQuery::Unspecified => f.write_str("latest"),
            VersionQuery::Partial(prefix) => f.write_str(prefix),
            VersionQuery::Exact(version) => write!(f, "{}", version),
        }
    }
}
