//! The release hosting seam.
//!
//! The mirror only talks to a hosting service through [`ReleaseHost`], so the
//! orchestration can run against GitHub or against an in-memory host in tests.

use crate::error::{DownloadError, GitHubError};
use crate::github::models::{
    Asset, AssetLocation, AssetUpload, CreateReleaseRequest, Release, RepoRef,
};
use bytes::Bytes;
use std::future::Future;

/// Release and asset operations the mirror needs from a hosting service
pub trait ReleaseHost: Send + Sync {
    /// List releases of `repo` (first page only)
    fn list_releases(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<Vec<Release>, GitHubError>> + Send;

    /// Fetch the release of `repo` pointing at `tag`
    fn get_release_by_tag(
        &self,
        repo: &RepoRef,
        tag: &str,
    ) -> impl Future<Output = Result<Release, GitHubError>> + Send;

    /// Create a release in `repo`
    fn create_release(
        &self,
        repo: &RepoRef,
        request: &CreateReleaseRequest,
    ) -> impl Future<Output = Result<Release, GitHubError>> + Send;

    /// Ask the asset endpoint where the bytes of `asset` are served from.
    ///
    /// Hosts usually redirect to a short-lived URL; some serve the content
    /// directly, in which case no second request is needed.
    fn locate_asset(
        &self,
        repo: &RepoRef,
        asset: &Asset,
    ) -> impl Future<Output = Result<AssetLocation, DownloadError>> + Send;

    /// Fetch the bytes behind a [`AssetLocation::Redirect`] URL
    fn download(
        &self,
        asset: &Asset,
        url: &str,
    ) -> impl Future<Output = Result<Bytes, DownloadError>> + Send;

    /// Attach a new asset to `release`
    fn upload_asset(
        &self,
        repo: &RepoRef,
        release: &Release,
        upload: AssetUpload,
    ) -> impl Future<Output = Result<Asset, GitHubError>> + Send;
}
