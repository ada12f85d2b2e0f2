//! # Kodegen Release Mirror
//!
//! Mirror a published GitHub release into another repository.
//!
//! Given a tag, the mirror fetches the source release, finds or creates the
//! release with the same tag in the destination repository, and copies every
//! asset byte-for-byte. Draft and prerelease releases are never mirrored.
//!
//! ## Features
//!
//! - **Idempotent resolution**: re-running for a tag reuses the destination release
//! - **Resumable copies**: assets already on the destination are skipped
//! - **Bounded transfers**: assets are copied by a fixed-size worker pool
//! - **Per-asset failures**: one broken asset never aborts the others
//! - **GitHub Actions native**: inputs, `time` output and error annotations
//!
//! ## Usage
//!
//! ```bash
//! kodegen_release_mirror --source-repo cyrup-ai/kodegen --destination-repo cyrup-ai/kodegen-dist --tag v1.2.3
//! GITHUB_REF=refs/tags/v1.2.3 kodegen_release_mirror --source-repo a/b --destination-repo c/d
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod actions;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod mirror;

// Re-export main types for public API
pub use cli::Args;
pub use config::{EnvConfig, EventConfig, MirrorConfig, parse_tag};
pub use error::{DownloadError, GitHubError, MirrorError, Result};
pub use github::{GitHubClient, ReleaseHost, RepoRef};
pub use mirror::{MirrorOutcome, MirrorReport, mirror_release};
