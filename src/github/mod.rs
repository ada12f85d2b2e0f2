//! GitHub integration for release mirroring

mod client;
mod host;
mod models;

pub use client::{DEFAULT_API_URL, GitHubClient, GitHubClientConfig};
pub use host::ReleaseHost;
pub use models::{
    Asset, AssetLocation, AssetUpload, CreateReleaseRequest, Release, ReleaseRef, RepoRef,
};
