//! Release mirroring: resolve the destination release, then copy assets.

mod replicator;
mod report;
mod resolver;

pub use replicator::{download_asset, replicate_assets};
pub use report::{AssetOutcome, AssetReport, MirrorOutcome, MirrorReport, SkipReason};
pub use resolver::{ResolvedRelease, resolve_release};

use crate::config::MirrorConfig;
use crate::error::Result;
use crate::github::ReleaseHost;
use chrono::Local;
use std::sync::Arc;

/// Mirror the release tagged `config.tag` from source to destination.
///
/// Draft and prerelease sources are skipped without touching the destination.
/// Lookup and resolution failures abort the run; asset failures are reported
/// per asset in the returned [`MirrorReport`].
pub async fn mirror_release<H: ReleaseHost + 'static>(
    host: Arc<H>,
    config: &MirrorConfig,
) -> Result<MirrorOutcome> {
    let source = host.get_release_by_tag(&config.source, &config.tag).await?;
    log::info!(
        "Found release {} (id {}) with {} asset(s)",
        config.source_release(),
        source.id,
        source.assets.len()
    );

    if source.is_unpublished() {
        let reason = if source.draft {
            SkipReason::Draft
        } else {
            SkipReason::Prerelease
        };
        log::info!("Release {} is a {}; not mirroring", config.tag, reason);
        return Ok(MirrorOutcome::Skipped {
            tag: config.tag.clone(),
            reason,
        });
    }

    let ResolvedRelease { release, created } =
        resolve_release(host.as_ref(), &config.destination, &config.tag, &source).await?;

    let assets = replicate_assets(
        Arc::clone(&host),
        &config.source,
        &config.destination,
        &release,
        source.assets,
        config.max_concurrency,
    )
    .await;

    Ok(MirrorOutcome::Mirrored(MirrorReport {
        tag: config.tag.clone(),
        destination: release,
        created,
        assets,
        completed_at: Local::now(),
    }))
}
