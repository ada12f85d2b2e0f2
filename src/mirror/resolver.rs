//! Destination release resolution (create-or-reuse keyed by tag).

use crate::error::Result;
use crate::github::{CreateReleaseRequest, Release, ReleaseHost, RepoRef};

/// Destination release chosen for a mirror run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    /// The destination release
    pub release: Release,
    /// Whether this run created it
    pub created: bool,
}

/// Find the release tagged `tag` in `destination`, or create it from `source`.
///
/// An existing release is returned untouched even when its metadata has drifted
/// from the source; the drift is only logged. Listing looks at the first page.
pub async fn resolve_release<H: ReleaseHost>(
    host: &H,
    destination: &RepoRef,
    tag: &str,
    source: &Release,
) -> Result<ResolvedRelease> {
    let releases = host.list_releases(destination).await?;

    if let Some(existing) = releases.into_iter().find(|r| r.tag_name == tag) {
        let diverged = existing.diverged_fields(source);
        if !diverged.is_empty() {
            log::warn!(
                "Release {} in {} differs from the source ({}); leaving it unchanged",
                tag,
                destination,
                diverged.join(", ")
            );
        }
        log::info!("Using existing release {} (id {}) in {}", tag, existing.id, destination);
        return Ok(ResolvedRelease {
            release: existing,
            created: false,
        });
    }

    let request = CreateReleaseRequest::mirroring(source, tag);
    let release = host.create_release(destination, &request).await?;
    log::info!("Created release {} (id {}) in {}", tag, release.id, destination);

    Ok(ResolvedRelease {
        release,
        created: true,
    })
}
