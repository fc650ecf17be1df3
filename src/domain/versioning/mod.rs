//! Versioning systems
//!
//! A versioning system decides how versions are generated, ordered and
//! partially matched. Two strategies ship with the crate:
//!
//! - `major_minor` - `MAJOR.MINOR` counters, queries may pin only the major
//! - `simple_date` - UTC timestamps `YYYY-MM-DDTHH-MM-SSZ`
//!
//! Strategies are looked up by name in a [`VersioningRegistry`], which can be
//! extended with custom implementations of [`VersioningSystem`].

mod major_minor;
mod simple_date;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::value_objects::{Version, VersionQuery};

pub use major_minor::MajorMinorVersioning;
pub use simple_date::SimpleDateVersioning;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version '{token}' for {system} versioning: {reason}")]
    Invalid {
        token: String,
        system: &'static str,
        reason: String,
    },
}

impl VersionError {
    pub(crate) fn invalid(system: &'static str, token: &str, reason: impl Into<String>) -> Self {
        VersionError::Invalid {
            token: token.to_string(),
            system,
            reason: reason.into(),
        }
    }
}

/// Strategy for generating, ordering and matching version tokens
pub trait VersioningSystem: Send + Sync + fmt::Debug {
    /// Registry key, also used in configuration
    fn name(&self) -> &'static str;

    /// Version given to the first push of an asset
    fn initial_version(&self) -> Version;

    /// Version following `current`.
    ///
    /// `bump_major` only means something to systems with a major component.
    fn next_version(&self, current: &Version, bump_major: bool) -> Result<Version, VersionError>;

    /// Total order over versions of this system
    fn compare(&self, a: &Version, b: &Version) -> Ordering;

    /// Whether `token` is a complete, well-formed version
    fn is_valid(&self, token: &str) -> bool;

    /// Parse a caller-supplied token (`None` when the caller gave none)
    fn parse_query(&self, token: Option<&str>) -> Result<VersionQuery, VersionError>;

    /// Whether `version` satisfies `query`
    fn matches(&self, version: &Version, query: &VersionQuery) -> bool;

    /// Whether the query pins a single version
    fn is_complete(&self, query: &VersionQuery) -> bool {
        matches!(query, VersionQuery::Exact(_))
    }

    /// Sort latest first
    fn sort_versions(&self, versions: &mut [Version]) {
        versions.sort_by(|a, b| self.compare(b, a));
    }

    /// Greatest version satisfying `query`
    fn latest_matching(&self, versions: &[Version], query: &VersionQuery) -> Option<Version> {
        versions
            .iter()
            .filter(|v| self.matches(v, query))
            .max_by(|a, b| self.compare(a, b))
            .cloned()
    }
}

/// Name → strategy table
#[derive(Debug, Clone)]
pub struct VersioningRegistry {
    systems: BTreeMap<&'static str, Arc<dyn VersioningSystem>>,
}

impl VersioningRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            systems: BTreeMap::new(),
        }
    }

    /// Registry holding `major_minor` and `simple_date`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MajorMinorVersioning));
        registry.register(Arc::new(SimpleDateVersioning));
        registry
    }

    /// Add a strategy, replacing any previous one with the same name
    pub fn register(&mut self, system: Arc<dyn VersioningSystem>) {
        self.systems.insert(system.name(), system);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn VersioningSystem>> {
        self.systems.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.systems.keys().map(|k| k.to_string()).collect()
    }
}

impl Default for VersioningRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
