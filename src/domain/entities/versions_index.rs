//! `<name>.versions` index document

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Version;
use crate::domain::versioning::VersioningSystem;

/// Every published version of one asset, latest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionsIndex {
    versions: Vec<Version>,
}

impl VersionsIndex {
    /// Index of a freshly created asset
    pub fn new(initial: Version) -> Self {
        Self {
            versions: vec![initial],
        }
    }

    pub fn versions(&self) -> &[Version] {
        &self.versions
    }

    pub fn into_versions(self) -> Vec<Version> {
        self.versions
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.versions.contains(version)
    }

    /// Add `version` and restore latest-first order
    pub fn insert(&mut self, version: Version, versioning: &dyn VersioningSystem) {
        if !self.contains(&version) {
            self.versions.push(version);
        }
        versioning.sort_versions(&mut self.versions);
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::versioning::MajorMinorVersioning;

    #[test]
    fn insert_keeps_latest_first() {
        let mut index = VersionsIndex::new(Version::new("0.0"));
        index.insert(Version::new("0.1"), &MajorMinorVersioning);
        index.insert(Version::new("1.0"), &MajorMinorVersioning);
        index.insert(Version::new("0.10"), &MajorMinorVersioning);

        let tokens: Vec<&str> = index.versions().iter().map(Version::as_str).collect();
        assert_eq!(tokens, ["1.0", "0.10", "0.1", "0.0"]);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut index = VersionsIndex::new(Version::new("0.0"));
        index.insert(Version::new("0.0"), &MajorMinorVersioning);
        assert_eq!(index.versions().len(), 1);
    }

    #[test]
    fn wire_format() {
        let mut index = VersionsIndex::new(Version::new("0.0"));
        index.insert(Version::new("0.1"), &MajorMinorVersioning);
        insta::assert_json_snapshot!(index, @r###"
        {
          "versions": [
            "0.1",
            "0.0"
          ]
        }
        "###);
    }

    #[test]
    fn parses_stored_document() {
        let index = VersionsIndex::from_json(br#"{"versions": ["1.0", "0.1", "0.0"]}"#).unwrap();
        assert!(index.contains(&Version::new("0.1")));
        assert!(VersionsIndex::from_json(b"[\"1.0\"]").is_err());
    }
}
