//! Asset replication: a bounded pool of workers drains a shared queue of
//! asset-copy jobs, each job being download-then-upload for one asset.

use crate::error::DownloadError;
use crate::github::{Asset, AssetLocation, AssetUpload, Release, ReleaseHost, RepoRef};
use crate::mirror::report::{AssetOutcome, AssetReport};
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;

/// Shared queue of indices into the asset list
type JobQueue = Arc<Mutex<VecDeque<usize>>>;

/// Copy `assets` from `source` onto `release` in `destination`.
///
/// At most `max_concurrency` transfers run at once. Every asset gets a report,
/// returned in the order of `assets`; a failing asset never stops the others.
pub async fn replicate_assets<H: ReleaseHost + 'static>(
    host: Arc<H>,
    source: &RepoRef,
    destination: &RepoRef,
    release: &Release,
    assets: Vec<Asset>,
    max_concurrency: usize,
) -> Vec<AssetReport> {
    let total = assets.len();
    if total == 0 {
        return Vec::new();
    }

    let assets: Arc<[Asset]> = assets.into();
    let queue: JobQueue = Arc::new(Mutex::new((0..total).collect()));
    let workers = max_concurrency.clamp(1, total);
    log::debug!("Copying {} asset(s) with {} worker(s)", total, workers);

    let mut pool = JoinSet::new();
    for _ in 0..workers {
        let host = Arc::clone(&host);
        let assets = Arc::clone(&assets);
        let queue = Arc::clone(&queue);
        let source = source.clone();
        let destination = destination.clone();
        let release = release.clone();

        pool.spawn(async move {
            let mut done = Vec::new();
            while let Some(index) = next_job(&queue) {
                let outcome =
                    copy_asset(host.as_ref(), &source, &destination, &release, &assets[index])
                        .await;
                done.push((index, outcome));
            }
            done
        });
    }

    let mut outcomes: Vec<Option<AssetOutcome>> = (0..total).map(|_| None).collect();
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(done) => {
                for (index, outcome) in done {
                    outcomes[index] = Some(outcome);
                }
            }
            Err(e) => log::error!("Asset transfer worker stopped: {}", e),
        }
    }

    assets
        .iter()
        .zip(outcomes)
        .map(|(asset, outcome)| AssetReport {
            source: asset.clone(),
            outcome: outcome.unwrap_or_else(|| AssetOutcome::Interrupted {
                reason: "transfer worker stopped before reporting".to_string(),
            }),
        })
        .collect()
}

fn next_job(queue: &Mutex<VecDeque<usize>>) -> Option<usize> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

/// Download one asset and upload it to the destination release
async fn copy_asset<H: ReleaseHost>(
    host: &H,
    source: &RepoRef,
    destination: &RepoRef,
    release: &Release,
    asset: &Asset,
) -> AssetOutcome {
    if let Some(existing) = release.asset_named(&asset.name) {
        if existing.size == asset.size {
            log::info!("Skipping {} (already uploaded)", asset.name);
            return AssetOutcome::AlreadyPresent;
        }
        log::warn!(
            "{} is already on the destination with {} bytes, source has {}",
            asset.name,
            existing.size,
            asset.size
        );
        return AssetOutcome::SizeConflict {
            existing: existing.size,
            expected: asset.size,
        };
    }

    let data = match download_asset(host, source, asset).await {
        Ok(data) => data,
        Err(e) => {
            log::error!("Failed to download {}: {}", e.asset(), e);
            return AssetOutcome::DownloadFailed(e);
        }
    };

    let upload = AssetUpload::from_source(asset, data);
    match host.upload_asset(destination, release, upload).await {
        Ok(uploaded) => {
            log::info!("Copied {} ({} bytes)", uploaded.name, uploaded.size);
            AssetOutcome::Copied { uploaded }
        }
        Err(e) => {
            log::error!("Failed to upload {}: {}", asset.name, e);
            AssetOutcome::UploadFailed(e)
        }
    }
}

/// Fetch the bytes of `asset` from `repo`.
///
/// Usually two round trips: one for the short-lived download URL, one for the
/// content. A host that serves the content from the asset endpoint takes one.
pub async fn download_asset<H: ReleaseHost>(
    host: &H,
    repo: &RepoRef,
    asset: &Asset,
) -> Result<Bytes, DownloadError> {
    let (url, data) = match host.locate_asset(repo, asset).await? {
        AssetLocation::Redirect(url) => {
            let data = host.download(asset, &url).await?;
            (url, data)
        }
        AssetLocation::Inline { url, data } => (url, data),
    };

    let actual = data.len() as u64;
    if actual != asset.size {
        return Err(DownloadError::SizeMismatch {
            asset: asset.name.clone(),
            url,
            expected: asset.size,
            actual,
        });
    }

    Ok(data)
}
