//! Per-version metadata stored in `<object>.meta`
//!
//! Wire format (JSON):
//!
//! ```json
//! {"push_date": "2024-01-31T12:00:00Z", "is_directory": false, "hash": "sha256:..."}
//! {"push_date": "2024-01-31T12:00:00Z", "is_directory": true, "contents": ["a.txt", "sub/b.txt"]}
//! ```
//!
//! In memory the file/directory duality is a tagged [`AssetContents`] so a
//! file meta cannot carry a listing and vice versa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ContentHash;

/// What a version's data object holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetContents {
    /// A single file, identified by its content hash
    File { hash: ContentHash },
    /// A directory, identified by its sorted `/`-joined file listing
    Directory { contents: Vec<String> },
}

impl AssetContents {
    pub fn is_directory(&self) -> bool {
        matches!(self, AssetContents::Directory { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssetMeta", into = "RawAssetMeta")]
pub struct AssetMeta {
    pub push_date: DateTime<Utc>,
    pub contents: AssetContents,
}

impl AssetMeta {
    pub fn file(hash: ContentHash) -> Self {
        Self {
            push_date: Utc::now(),
            contents: AssetContents::File { hash },
        }
    }

    /// Directory meta; the listing is sorted so it compares stably
    pub fn directory(mut contents: Vec<String>) -> Self {
        contents.sort();
        Self {
            push_date: Utc::now(),
            contents: AssetContents::Directory { contents },
        }
    }

    pub fn is_directory(&self) -> bool {
        self.contents.is_directory()
    }

    /// Parse the JSON stored remotely or in the local cache
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawAssetMeta {
    push_date: DateTime<Utc>,
    is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<ContentHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contents: Option<Vec<String>>,
}

impl TryFrom<RawAssetMeta> for AssetMeta {
    type Error = String;

    fn try_from(raw: RawAssetMeta) -> Result<Self, Self::Error> {
        let contents = if raw.is_directory {
            let contents = raw
                .contents
                .ok_or_else(|| "directory meta without `contents`".to_string())?;
            AssetContents::Directory { contents }
        } else {
            let hash = raw
                .hash
                .ok_or_else(|| "file meta without `hash`".to_string())?;
            let hex = hash.hex();
            if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(format!("unsupported hash '{}'", hash));
            }
            AssetContents::File { hash }
        };
        Ok(AssetMeta {
            push_date: raw.push_date,
            contents,
        })
    }
}

impl From<AssetMeta> for RawAssetMeta {
    fn from(meta: AssetMeta) -> Self {
        match meta.contents {
            AssetContents::File { hash } => RawAssetMeta {
                push_date: meta.push_date,
                is_directory: false,
                hash: Some(hash),
                contents: None,
            },
            AssetContents::Directory { contents } => RawAssetMeta {
                push_date: meta.push_date,
                is_directory: true,
                hash: None,
                contents: Some(contents),
            },
        }
    }
}
