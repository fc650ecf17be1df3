//! Asset specification parser
//!
//! Callers reference assets with strings such as:
//!
//! ```text
//! vocab                      latest version of `vocab`
//! docs/vocab:1               latest 1.x of `docs/vocab`
//! docs/vocab:1.2             exactly 1.2
//! models/bert:1.0[config/tokenizer.json]
//!                            a file inside a directory asset
//! ```
//!
//! Grammar: `segment(/segment)*(:version)?(\[subpath\])?`. The version token is
//! interpreted by the active versioning system.

use std::fmt;

use crate::domain::versioning::VersioningSystem;
use crate::error::{AssetError, AssetResult};

use super::VersionQuery;

/// A parsed asset reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpecification {
    category_path: Vec<String>,
    name: String,
    version_query: VersionQuery,
    subpath: Option<String>,
}

impl AssetSpecification {
    /// Parse `spec`, letting `versioning` interpret the version token
    pub fn parse(spec: &str, versioning: &dyn VersioningSystem) -> AssetResult<Self> {
        let raw = tokenize(spec)?;

        let mut segments = Vec::new();
        for segment in raw.name.split('/') {
            if !is_name_segment(segment) {
                let offending = if segment.is_empty() { raw.name } else { segment };
                return Err(malformed(
                    spec,
                    offending,
                    "name segments use [a-z0-9._-] and start and end with a letter or digit",
                ));
            }
            segments.push(segment.to_string());
        }

        let subpath = match raw.subpath {
            Some(subpath) => Some(parse_subpath(spec, subpath)?),
            None => None,
        };

        let version_query = versioning.parse_query(raw.version)?;

        let name = segments.pop().unwrap_or_default();
        Ok(Self {
            category_path: segments,
            name,
            version_query,
            subpath,
        })
    }

    /// Segments before the leaf name (`["docs"]` for `docs/vocab`)
    pub fn category_path(&self) -> &[String] {
        &self.category_path
    }

    /// Leaf name (`vocab` for `docs/vocab`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full logical name used as the remote key (`docs/vocab`)
    pub fn asset_name(&self) -> String {
        let mut parts: Vec<&str> = self.category_path.iter().map(String::as_str).collect();
        parts.push(&self.name);
        parts.join("/")
    }

    pub fn version_query(&self) -> &VersionQuery {
        &self.version_query
    }

    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    /// Subpath split into path segments
    pub fn subpath_segments(&self) -> Vec<&str> {
        self.subpath
            .as_deref()
            .map(|s| s.split('/').collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for AssetSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.asset_name())?;
        match &self.version_query {
            VersionQuery::Unspecified => {}
            other => write!(f, ":{}", other)?,
        }
        if let Some(subpath) = &self.subpath {
            write!(f, "[{}]", subpath)?;
        }
        Ok(())
    }
}

struct RawSpec<'a> {
    name: &'a str,
    version: Option<&'a str>,
    subpath: Option<&'a str>,
}

/// Split `spec` into name, version and subpath without validating them
fn tokenize(spec: &str) -> AssetResult<RawSpec<'_>> {
    if spec.is_empty() {
        return Err(malformed(spec, spec, "empty specification"));
    }

    let (head, subpath) = match spec.find('[') {
        Some(open) => {
            let rest = &spec[open..];
            if !rest.ends_with(']') || rest.len() < 2 {
                return Err(malformed(spec, rest, "sub-path must be enclosed in [...]"));
            }
            let inner = &rest[1..rest.len() - 1];
            if inner.contains('[') || inner.contains(']') {
                return Err(malformed(spec, rest, "unbalanced brackets in sub-path"));
            }
            (&spec[..open], Some(inner))
        }
        None => {
            if let Some(close) = spec.find(']') {
                return Err(malformed(spec, &spec[close..], "unexpected ']'"));
            }
            (spec, None)
        }
    };

    let (name, version) = match head.split_once(':') {
        Some((name, version)) => {
            if version.is_empty() {
                return Err(malformed(spec, ":", "missing version after ':'"));
            }
            if version.contains(':') {
                return Err(malformed(spec, version, "more than one ':'"));
            }
            (name, Some(version))
        }
        None => (head, None),
    };

    if name.is_empty() {
        return Err(malformed(spec, head, "missing asset name"));
    }

    Ok(RawSpec {
        name,
        version,
        subpath,
    })
}

fn parse_subpath(spec: &str, subpath: &str) -> AssetResult<String> {
    let trimmed = subpath.strip_prefix('/').unwrap_or(subpath);
    if trimmed.is_empty() {
        return Err(malformed(spec, "[]", "empty sub-path"));
    }
    for segment in trimmed.split('/') {
        let valid = !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            let offending = if segment.is_empty() { subpath } else { segment };
            return Err(malformed(spec, offending, "invalid sub-path segment"));
        }
    }
    Ok(trimmed.to_string())
}

fn is_name_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let edge_ok = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            edge_ok(first)
                && edge_ok(last)
                && bytes
                    .iter()
                    .all(|b| edge_ok(b) || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

fn malformed(spec: &str, offending: &str, reason: &str) -> AssetError {
    AssetError::MalformedSpecification {
        spec: spec.to_string(),
        offending: offending.to_string(),
        reason: reason.to_string(),
    }
}
