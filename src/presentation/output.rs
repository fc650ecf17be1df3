//! Output Rendering
//!
//! Text for humans, one JSON object per result for scripts. Renderers return
//! strings; the commands decide where they go.

use serde_json::json;

use crate::application::{FetchedAsset, RemoteObjects};
use crate::domain::value_objects::Version;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Result of `new` or `update`
pub fn render_pushed(
    format: OutputFormat,
    name: &str,
    version: &Version,
    remote: &RemoteObjects,
    dry_run: bool,
) -> String {
    match format {
        OutputFormat::Json => json!({
            "type": "asset_pushed",
            "name": name,
            "version": version,
            "dry_run": dry_run,
            "remote": remote,
        })
        .to_string(),
        OutputFormat::Text => format!(
            "{} {} version {}\n  object: {}",
            if dry_run { "Would push" } else { "Pushed" },
            name,
            version,
            remote.object_uri
        ),
    }
}

/// Result of `list`, assets sorted by name with versions latest first
pub fn render_list(format: OutputFormat, assets: &[(String, Vec<Version>)]) -> String {
    match format {
        OutputFormat::Json => {
            let items: Vec<_> = assets
                .iter()
                .map(|(name, versions)| json!({ "name": name, "versions": versions }))
                .collect();
            json!({ "type": "asset_list", "assets": items }).to_string()
        }
        OutputFormat::Text => {
            if assets.is_empty() {
                return "No assets found.".to_string();
            }
            let width = assets.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
            assets
                .iter()
                .map(|(name, versions)| {
                    let versions: Vec<&str> = versions.iter().map(Version::as_str).collect();
                    format!("{:<width$}  {}", name, versions.join(", "), width = width)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Result of `fetch`: the bare path, or every detail with `info`
pub fn render_fetch(format: OutputFormat, fetched: &FetchedAsset, info: bool) -> String {
    match format {
        OutputFormat::Json => {
            let mut value = json!({ "type": "asset_fetched", "path": fetched.path });
            if info {
                value["asset"] = json!(fetched);
            }
            value.to_string()
        }
        OutputFormat::Text if !info => fetched.path.display().to_string(),
        OutputFormat::Text => {
            let mut lines = vec![
                format!("path:       {}", fetched.path.display()),
                format!("asset path: {}", fetched.base_asset_path.display()),
                format!("name:       {}", fetched.name),
                format!(
                    "version:    {}",
                    fetched.version.as_ref().map_or("(unversioned)", Version::as_str)
                ),
                format!(
                    "origin:     {}",
                    if fetched.from_cache { "cache" } else { "downloaded" }
                ),
            ];
            if let Some(meta) = &fetched.meta {
                lines.push(format!("pushed:     {}", meta.push_date.to_rfc3339()));
            }
            if let Some(remote) = &fetched.remote {
                lines.push(format!("object:     {}", remote.object_uri));
            }
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fetched() -> FetchedAsset {
        FetchedAsset {
            path: PathBuf::from("/cache/docs/vocab-0.1"),
            base_asset_path: PathBuf::from("/cache/docs/vocab-0.1"),
            name: "docs/vocab".to_string(),
            version: Some(Version::new("0.1")),
            from_cache: true,
            meta: None,
            remote: None,
        }
    }

    fn remote() -> RemoteObjects {
        RemoteObjects {
            object_name: "assets/docs/vocab/0.1".to_string(),
            meta_object_name: "assets/docs/vocab/0.1.meta".to_string(),
            versions_object_name: "assets/docs/vocab.versions".to_string(),
            object_uri: "file:///bucket/assets/docs/vocab/0.1".to_string(),
        }
    }

    #[test]
    fn test_fetch_text_is_bare_path() {
        assert_eq!(
            render_fetch(OutputFormat::Text, &fetched(), false),
            "/cache/docs/vocab-0.1"
        );
    }

    #[test]
    fn test_fetch_text_info() {
        let text = render_fetch(OutputFormat::Text, &fetched(), true);
        assert!(text.contains("version:    0.1"));
        assert!(text.contains("origin:     cache"));
    }

    #[test]
    fn test_fetch_json_info() {
        let out = render_fetch(OutputFormat::Json, &fetched(), true);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "asset_fetched");
        assert_eq!(value["asset"]["version"], "0.1");
        assert_eq!(value["asset"]["from_cache"], true);
    }

    #[test]
    fn test_list_text_aligns_names() {
        let assets = vec![
            (
                "docs/vocab".to_string(),
                vec![Version::new("1.0"), Version::new("0.1")],
            ),
            ("m".to_string(), vec![Version::new("0.0")]),
        ];
        insta::assert_snapshot!(render_list(OutputFormat::Text, &assets), @r"
        docs/vocab  1.0, 0.1
        m           0.0
        ");
    }

    #[test]
    fn test_list_empty() {
        assert_eq!(render_list(OutputFormat::Text, &[]), "No assets found.");
    }

    #[test]
    fn test_pushed_json() {
        let out = render_pushed(
            OutputFormat::Json,
            "docs/vocab",
            &Version::new("0.1"),
            &remote(),
            false,
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "asset_pushed");
        assert_eq!(value["dry_run"], false);
        assert_eq!(value["version"], "0.1");
        assert_eq!(value["remote"]["meta_object_name"], "assets/docs/vocab/0.1.meta");
    }

    #[test]
    fn test_pushed_text() {
        let out = render_pushed(
            OutputFormat::Text,
            "docs/vocab",
            &Version::new("0.1"),
            &remote(),
            false,
        );
        insta::assert_snapshot!(out, @r"
        Pushed docs/vocab version 0.1
          object: file:///bucket/assets/docs/vocab/0.1
        ");
    }

    #[test]
    fn test_dry_run_text() {
        let out = render_pushed(
            OutputFormat::Text,
            "docs/vocab",
            &Version::new("0.1"),
            &remote(),
            true,
        );
        insta::assert_snapshot!(out, @r"
        Would push docs/vocab version 0.1
          object: file:///bucket/assets/docs/vocab/0.1
        ");
    }
}
