//! reqwest-backed GitHub REST client.

use crate::cli::RetryConfig;
use crate::error::{CliError, DownloadError, GitHubError, MirrorError, Result};
use crate::github::host::ReleaseHost;
use crate::github::models::{
    Asset, AssetLocation, AssetUpload, CreateReleaseRequest, Release, RepoRef,
};
use bytes::{Bytes, BytesMut};
use futures_lite::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, redirect};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request
const API_VERSION: &str = "2022-11-28";

const OCTET_STREAM: &str = "application/octet-stream";

/// Longest wait between two attempts of the same request
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Settings for [`GitHubClient`]
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// API base URL (`https://api.github.com` or `https://ghe.host/api/v3`)
    pub api_url: String,
    /// Token sent as `Authorization: Bearer`
    pub token: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Transport retry tuning
    pub retry: RetryConfig,
}

impl GitHubClientConfig {
    /// Settings for the public API with default timeout and retries
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(300),
            retry: RetryConfig::default(),
        }
    }
}

/// GitHub REST client implementing [`ReleaseHost`]
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// API client; follows the redirects GitHub issues for renamed repositories
    api: reqwest::Client,
    /// API client for the asset endpoint; its redirect is the download URL
    assets: reqwest::Client,
    /// Client for fetching asset bytes from transient URLs
    downloads: reqwest::Client,
    api_url: Url,
    token: String,
    retry: RetryConfig,
}

impl GitHubClient {
    /// Create a client from its settings
    pub fn new(config: GitHubClientConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            MirrorError::Cli(CliError::InvalidArguments {
                reason: format!("Invalid GitHub API URL '{}': {}", config.api_url, e),
            })
        })?;
        if api_url.cannot_be_a_base() {
            return Err(MirrorError::Cli(CliError::InvalidArguments {
                reason: format!("GitHub API URL '{}' cannot be used as a base", config.api_url),
            }));
        }

        let user_agent = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

        let mut api_headers = HeaderMap::new();
        api_headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        api_headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let api = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(api_headers.clone())
            .timeout(config.timeout)
            .build()
            .map_err(GitHubError::Client)?;

        let assets = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(api_headers)
            .redirect(redirect::Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(GitHubError::Client)?;

        let downloads = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(GitHubError::Client)?;

        Ok(Self {
            api,
            assets,
            downloads,
            api_url,
            token: config.token,
            retry: config.retry,
        })
    }

    /// API URL for `repos/{owner}/{repo}/...segments`
    fn endpoint(&self, repo: &RepoRef, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
                .extend(segments);
        }
        url
    }

    /// Send a request, retrying transient failures with exponential backoff
    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> std::result::Result<Response, GitHubError> {
        let request = request.bearer_auth(&self.token);
        let mut attempts = 0u32;

        loop {
            let Some(current) = request.try_clone() else {
                // Streaming bodies cannot be replayed
                return send_once(operation, request).await;
            };

            match send_once(operation, current).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempts < self.retry.github_api => {
                    attempts += 1;
                    let wait =
                        Duration::from_secs(2u64.saturating_pow(attempts - 1)).min(MAX_BACKOFF);
                    log::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                        operation,
                        attempts,
                        self.retry.github_api + 1,
                        e,
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> std::result::Result<T, GitHubError> {
        let response = self.send(operation, request).await?;
        if response.status().is_redirection() {
            // Followed redirects never get here; this is a 3xx without a usable Location
            return Err(GitHubError::InvalidResponse {
                operation: operation.to_string(),
                reason: format!("unexpected redirect ({})", response.status()),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| GitHubError::InvalidResponse {
                operation: operation.to_string(),
                reason: e.to_string(),
            })
    }
}

async fn send_once(
    operation: &str,
    request: RequestBuilder,
) -> std::result::Result<Response, GitHubError> {
    let response = request.send().await.map_err(|source| GitHubError::Request {
        operation: operation.to_string(),
        source,
    })?;

    let status = response.status();
    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(GitHubError::Api {
        operation: operation.to_string(),
        status: status.as_u16(),
        message: api_message(&text),
    })
}

/// Drain a response body into memory
async fn read_body(
    asset: &Asset,
    url: &str,
    response: Response,
) -> std::result::Result<Bytes, DownloadError> {
    let fetch = |reason: String| DownloadError::Fetch {
        asset: asset.name.clone(),
        url: url.to_string(),
        reason,
    };

    let mut data = BytesMut::with_capacity(usize::try_from(asset.size).unwrap_or_default());
    let mut stream = std::pin::pin!(response.bytes_stream());
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| fetch(e.to_string()))?;
        data.extend_from_slice(&chunk);
    }

    log::debug!("Downloaded {} ({} bytes)", asset.name, data.len());
    Ok(data.freeze())
}

/// Extract `message` from a GitHub error body, falling back to the raw text
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Turn an `upload_url` template into the upload endpoint for `upload`
fn upload_endpoint(
    upload_url: &str,
    upload: &AssetUpload,
) -> std::result::Result<Url, GitHubError> {
    let base = upload_url.split('{').next().unwrap_or_default();
    let mut url = Url::parse(base).map_err(|e| GitHubError::InvalidResponse {
        operation: "upload release asset".to_string(),
        reason: format!("invalid upload_url '{}': {}", upload_url, e),
    })?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("name", &upload.name);
        if let Some(label) = &upload.label {
            query.append_pair("label", label);
        }
    }
    Ok(url)
}

impl ReleaseHost for GitHubClient {
    async fn list_releases(
        &self,
        repo: &RepoRef,
    ) -> std::result::Result<Vec<Release>, GitHubError> {
        let url = self.endpoint(repo, &["releases"]);
        self.send_json("list releases", self.api.get(url)).await
    }

    async fn get_release_by_tag(
        &self,
        repo: &RepoRef,
        tag: &str,
    ) -> std::result::Result<Release, GitHubError> {
        let url = self.endpoint(repo, &["releases", "tags", tag]);
        self.send_json("get release by tag", self.api.get(url)).await
    }

    async fn create_release(
        &self,
        repo: &RepoRef,
        request: &CreateReleaseRequest,
    ) -> std::result::Result<Release, GitHubError> {
        let url = self.endpoint(repo, &["releases"]);
        self.send_json("create release", self.api.post(url).json(request)).await
    }

    async fn locate_asset(
        &self,
        repo: &RepoRef,
        asset: &Asset,
    ) -> std::result::Result<AssetLocation, DownloadError> {
        let asset_id = asset.id.to_string();
        let url = self.endpoint(repo, &["releases", "assets", &asset_id]);
        let request = self.assets.get(url.clone()).header(header::ACCEPT, OCTET_STREAM);

        let resolve = |source| DownloadError::Resolve {
            asset: asset.name.clone(),
            source,
        };

        let response = self.send("get release asset", request).await.map_err(resolve)?;
        if !response.status().is_redirection() {
            let url = url.to_string();
            let data = read_body(asset, &url, response).await?;
            return Ok(AssetLocation::Inline { url, data });
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                resolve(GitHubError::InvalidResponse {
                    operation: "get release asset".to_string(),
                    reason: "redirect without Location header".to_string(),
                })
            })?;

        let target = url.join(location).map_err(|e| {
            resolve(GitHubError::InvalidResponse {
                operation: "get release asset".to_string(),
                reason: format!("invalid Location '{}': {}", location, e),
            })
        })?;
        Ok(AssetLocation::Redirect(target.into()))
    }

    async fn download(
        &self,
        asset: &Asset,
        url: &str,
    ) -> std::result::Result<Bytes, DownloadError> {
        let fetch = |reason: String| DownloadError::Fetch {
            asset: asset.name.clone(),
            url: url.to_string(),
            reason,
        };

        let response = self
            .downloads
            .get(url)
            .header(header::ACCEPT, OCTET_STREAM)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch(format!("HTTP {}", status)));
        }

        read_body(asset, url, response).await
    }

    async fn upload_asset(
        &self,
        _repo: &RepoRef,
        release: &Release,
        upload: AssetUpload,
    ) -> std::result::Result<Asset, GitHubError> {
        let url = upload_endpoint(&release.upload_url, &upload)?;
        let request = self
            .api
            .post(url)
            .header(header::CONTENT_TYPE, upload.content_type.as_str())
            .header(header::CONTENT_LENGTH, upload.content_length().to_string())
            .body(upload.data);

        self.send_json("upload release asset", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GitHubClient {
        let mut config = GitHubClientConfig::new("t0ken");
        config.api_url = api_url.to_string();
        GitHubClient::new(config).expect("client builds")
    }

    #[test]
    fn test_endpoint_public_api() {
        let client = client(DEFAULT_API_URL);
        let repo = RepoRef::new("cyrup-ai", "kodegen");
        assert_eq!(
            client.endpoint(&repo, &["releases", "tags", "v1.2.3"]).as_str(),
            "https://api.github.com/repos/cyrup-ai/kodegen/releases/tags/v1.2.3"
        );
    }

    #[test]
    fn test_endpoint_enterprise_base_path() {
        let client = client("https://ghe.example.com/api/v3/");
        let repo = RepoRef::new("team", "tool");
        assert_eq!(
            client.endpoint(&repo, &["releases"]).as_str(),
            "https://ghe.example.com/api/v3/repos/team/tool/releases"
        );
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let client = client(DEFAULT_API_URL);
        let repo = RepoRef::new("o", "r");
        let url = client.endpoint(&repo, &["releases", "tags", "v1 beta"]);
        assert!(url.as_str().ends_with("/tags/v1%20beta"));
    }

    #[test]
    fn test_rejects_invalid_api_url() {
        let mut config = GitHubClientConfig::new("t0ken");
        config.api_url = "not a url".to_string();
        assert!(GitHubClient::new(config).is_err());
    }

    #[test]
    fn test_upload_endpoint_strips_template() {
        let upload = AssetUpload {
            name: "tool linux.tar.gz".to_string(),
            label: Some("Linux x86_64".to_string()),
            content_type: "application/gzip".to_string(),
            data: Bytes::from_static(b"abc"),
        };
        let url = upload_endpoint(
            "https://uploads.github.com/repos/o/r/releases/9/assets{?name,label}",
            &upload,
        )
        .expect("valid template");
        assert_eq!(
            url.as_str(),
            "https://uploads.github.com/repos/o/r/releases/9/assets?name=tool+linux.tar.gz&label=Linux+x86_64"
        );
    }

    #[test]
    fn test_upload_endpoint_omits_missing_label() {
        let upload = AssetUpload {
            name: "tool.zip".to_string(),
            label: None,
            content_type: "application/zip".to_string(),
            data: Bytes::new(),
        };
        let url = upload_endpoint(
            "https://uploads.github.com/repos/o/r/releases/9/assets{?name,label}",
            &upload,
        )
        .expect("valid template");
        assert_eq!(url.query(), Some("name=tool.zip"));
    }

    #[test]
    fn test_upload_endpoint_requires_url() {
        let upload = AssetUpload {
            name: "tool.zip".to_string(),
            label: None,
            content_type: "application/zip".to_string(),
            data: Bytes::new(),
        };
        assert!(upload_endpoint("", &upload).is_err());
    }

    #[test]
    fn test_api_message_prefers_json_message() {
        assert_eq!(
            api_message(r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#),
            "Not Found"
        );
        assert_eq!(api_message("  bad gateway \n"), "bad gateway");
    }
}
