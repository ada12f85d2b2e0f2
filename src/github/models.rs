//! GitHub REST models for releases and release assets.
//!
//! Only the fields the mirror reads or writes are modelled; serde ignores the rest.

use crate::error::{CliError, MirrorError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository identifier in `owner/name` form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Create a repository reference from its parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(MirrorError::Cli(CliError::InvalidArguments {
                reason: format!(
                    "Invalid GitHub repository format: '{}'. Expected: owner/repo",
                    input
                ),
            })),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A release within a specific repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRef {
    /// Repository holding the release
    pub repo: RepoRef,
    /// Tag the release points at
    pub tag: String,
}

impl fmt::Display for ReleaseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.repo, self.tag)
    }
}

/// A GitHub release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Service-assigned release identifier
    pub id: u64,
    /// Tag name (join key between source and destination)
    pub tag_name: String,
    /// Release title
    #[serde(default)]
    pub name: Option<String>,
    /// Release notes
    #[serde(default)]
    pub body: Option<String>,
    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,
    /// Whether the release is a prerelease
    #[serde(default)]
    pub prerelease: bool,
    /// Upload URL template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    #[serde(default)]
    pub upload_url: String,
    /// Browser URL of the release page
    #[serde(default)]
    pub html_url: String,
    /// Attached binary assets
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Whether this release must not be mirrored
    pub fn is_unpublished(&self) -> bool {
        self.draft || self.prerelease
    }

    /// The attached asset called `name`, if any
    pub fn asset_named(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.name == name)
    }

    /// Names of the metadata fields that differ from `other`
    pub fn diverged_fields(&self, other: &Release) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name != other.name {
            fields.push("name");
        }
        if self.body != other.body {
            fields.push("body");
        }
        if self.draft != other.draft {
            fields.push("draft");
        }
        if self.prerelease != other.prerelease {
            fields.push("prerelease");
        }
        fields
    }
}

/// A binary asset attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Service-assigned asset identifier
    pub id: u64,
    /// File name, unique within its release
    pub name: String,
    /// Optional display label
    #[serde(default)]
    pub label: Option<String>,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// MIME type
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// API URL of the asset
    #[serde(default)]
    pub url: String,
    /// Public download URL
    #[serde(default)]
    pub browser_download_url: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Where the bytes of a source asset are served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// Short-lived URL the asset endpoint redirected to; fetched separately
    Redirect(String),
    /// The asset endpoint answered with the content itself
    Inline {
        /// URL that served the content
        url: String,
        /// Asset bytes
        data: Bytes,
    },
}

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateReleaseRequest {
    /// Tag to attach the release to
    pub tag_name: String,
    /// Release title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Release notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Draft flag
    pub draft: bool,
    /// Prerelease flag
    pub prerelease: bool,
}

impl CreateReleaseRequest {
    /// Copy title, notes and flags of `source` under `tag`
    pub fn mirroring(source: &Release, tag: &str) -> Self {
        Self {
            tag_name: tag.to_string(),
            name: source.name.clone(),
            body: source.body.clone(),
            draft: source.draft,
            prerelease: source.prerelease,
        }
    }
}

/// Content and metadata for one asset upload
#[derive(Debug, Clone)]
pub struct AssetUpload {
    /// File name
    pub name: String,
    /// Optional display label
    pub label: Option<String>,
    /// MIME type sent as `Content-Type`
    pub content_type: String,
    /// Asset bytes
    pub data: Bytes,
}

impl AssetUpload {
    /// Build an upload that reproduces `source` with the downloaded `data`
    pub fn from_source(source: &Asset, data: Bytes) -> Self {
        Self {
            name: source.name.clone(),
            label: source.label.clone(),
            content_type: source.content_type.clone(),
            data,
        }
    }

    /// Value sent as `Content-Length`
    pub fn content_length(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_parse() {
        let repo = RepoRef::parse("cyrup-ai/kodegen").expect("valid repo");
        assert_eq!(repo.owner, "cyrup-ai");
        assert_eq!(repo.name, "kodegen");
        assert_eq!(repo.to_string(), "cyrup-ai/kodegen");
    }

    #[test]
    fn test_repo_ref_rejects_malformed() {
        assert!(RepoRef::parse("kodegen").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
        assert!(RepoRef::parse("/kodegen").is_err());
        assert!(RepoRef::parse("cyrup-ai/").is_err());
    }

    #[test]
    fn test_release_deserializes_nulls() {
        let json = r#"{
            "id": 7,
            "tag_name": "v1.0.0",
            "name": null,
            "body": null,
            "draft": false,
            "prerelease": false,
            "upload_url": "https://uploads.github.com/repos/o/r/releases/7/assets{?name,label}",
            "html_url": "https://github.com/o/r/releases/tag/v1.0.0",
            "author": {"login": "octocat"},
            "assets": [{
                "id": 11,
                "name": "tool.zip",
                "label": null,
                "size": 42,
                "content_type": "application/zip",
                "url": "https://api.github.com/repos/o/r/releases/assets/11",
                "browser_download_url": "https://github.com/o/r/releases/download/v1.0.0/tool.zip"
            }]
        }"#;

        let release: Release = serde_json::from_str(json).expect("release parses");
        assert_eq!(release.name, None);
        assert_eq!(release.assets[0].label, None);
        assert_eq!(release.assets[0].size, 42);
        assert_eq!(release.asset_named("tool.zip").map(|a| a.id), Some(11));
        assert!(release.asset_named("tool.tar.gz").is_none());
        assert!(!release.is_unpublished());
    }

    #[test]
    fn test_create_request_copies_metadata() {
        let source = Release {
            id: 1,
            tag_name: "v2.0.0".to_string(),
            name: Some("Two".to_string()),
            body: Some("notes".to_string()),
            draft: false,
            prerelease: false,
            upload_url: String::new(),
            html_url: String::new(),
            assets: Vec::new(),
        };

        let request = CreateReleaseRequest::mirroring(&source, "v2.0.0");
        let json = serde_json::to_value(&request).expect("serializes");
        assert_eq!(json["tag_name"], "v2.0.0");
        assert_eq!(json["name"], "Two");
        assert_eq!(json["body"], "notes");
        assert_eq!(json["draft"], false);
    }

    #[test]
    fn test_diverged_fields() {
        let mut a = Release {
            id: 1,
            tag_name: "v1".to_string(),
            name: Some("One".to_string()),
            body: None,
            draft: false,
            prerelease: false,
            upload_url: String::new(),
            html_url: String::new(),
            assets: Vec::new(),
        };
        let b = a.clone();
        assert!(a.diverged_fields(&b).is_empty());

        a.body = Some("changed".to_string());
        assert_eq!(a.diverged_fields(&b), vec!["body"]);
    }
}
