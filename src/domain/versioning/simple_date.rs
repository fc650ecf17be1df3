//! UTC date versioning
//!
//! Every push is versioned with the current UTC time, formatted
//! `YYYY-MM-DDTHH-MM-SSZ` (dashes instead of colons so the token is a valid
//! file name everywhere). Lexicographic and chronological order coincide.
//! There is no partial form: a supplied token always pins one version.

use std::cmp::Ordering;

use chrono::{NaiveDateTime, Utc};

use crate::domain::value_objects::{Version, VersionQuery};

use super::{VersionError, VersioningSystem};

const NAME: &str = "simple_date";

pub const DATE_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimpleDateVersioning;

impl SimpleDateVersioning {
    fn now() -> Version {
        Version::new(Utc::now().format(DATE_FORMAT).to_string())
    }
}

impl VersioningSystem for SimpleDateVersioning {
    fn name(&self) -> &'static str {
        NAME
    }

    fn initial_version(&self) -> Version {
        Self::now()
    }

    /// Current UTC time, whatever `current` is.
    ///
    /// Two pushes within the same second produce the same token; the remote
    /// store rejects the second one as an existing version.
    fn next_version(&self, _current: &Version, _bump_major: bool) -> Result<Version, VersionError> {
        Ok(Self::now())
    }

    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.as_str().cmp(b.as_str())
    }

    fn is_valid(&self, token: &str) -> bool {
        // chrono accepts unpadded fields, the fixed length rules them out
        token.len() == 20 && NaiveDateTime::parse_from_str(token, DATE_FORMAT).is_ok()
    }

    fn parse_query(&self, token: Option<&str>) -> Result<VersionQuery, VersionError> {
        match token {
            None => Ok(VersionQuery::Unspecified),
            Some(token) if self.is_valid(token) => Ok(VersionQuery::Exact(Version::new(token))),
            Some(token) => Err(VersionError::invalid(
                NAME,
                token,
                "expected a UTC date like 2024-01-31T12-00-00Z",
            )),
        }
    }

    fn matches(&self, version: &Version, query: &VersionQuery) -> bool {
        match query {
            VersionQuery::Unspecified => self.is_valid(version.as_str()),
            VersionQuery::Partial(_) => false,
            VersionQuery::Exact(exact) => exact == version,
        }
    }
}
