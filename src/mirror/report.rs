//! Outcomes of a mirror run.

use crate::error::{DownloadError, GitHubError};
use crate::github::{Asset, Release};
use chrono::{DateTime, Local};

/// Terminal status of one asset transfer
#[derive(Debug)]
pub enum AssetOutcome {
    /// Downloaded and uploaded
    Copied {
        /// Asset as created on the destination
        uploaded: Asset,
    },
    /// The destination release already carried an asset with this name and size
    AlreadyPresent,
    /// The destination carries an asset with this name but a different size
    SizeConflict {
        /// Size of the asset on the destination
        existing: u64,
        /// Size of the source asset
        expected: u64,
    },
    /// Could not fetch the source bytes; nothing was uploaded
    DownloadFailed(DownloadError),
    /// Fetched, but the destination rejected the upload
    UploadFailed(GitHubError),
    /// The transfer never reported back
    Interrupted {
        /// What stopped it
        reason: String,
    },
}

impl AssetOutcome {
    /// Whether the asset ended up on the destination release
    pub fn is_success(&self) -> bool {
        matches!(self, AssetOutcome::Copied { .. } | AssetOutcome::AlreadyPresent)
    }

    /// Human-readable failure, if any
    pub fn failure(&self) -> Option<String> {
        match self {
            AssetOutcome::DownloadFailed(e) => Some(e.to_string()),
            AssetOutcome::UploadFailed(e) => Some(e.to_string()),
            AssetOutcome::SizeConflict { existing, expected } => Some(format!(
                "destination already has an asset of this name with {} bytes, expected {}",
                existing, expected
            )),
            AssetOutcome::Interrupted { reason } => Some(reason.clone()),
            AssetOutcome::Copied { .. } | AssetOutcome::AlreadyPresent => None,
        }
    }
}

/// Outcome for one source asset
#[derive(Debug)]
pub struct AssetReport {
    /// The source asset
    pub source: Asset,
    /// What happened to it
    pub outcome: AssetOutcome,
}

/// Summary of a completed mirror run
#[derive(Debug)]
pub struct MirrorReport {
    /// Mirrored tag
    pub tag: String,
    /// Destination release (as resolved, before assets were added)
    pub destination: Release,
    /// Whether the destination release was created by this run
    pub created: bool,
    /// Per-asset outcomes, in source order
    pub assets: Vec<AssetReport>,
    /// Wall-clock completion time
    pub completed_at: DateTime<Local>,
}

impl MirrorReport {
    /// Assets uploaded by this run
    pub fn copied(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| matches!(a.outcome, AssetOutcome::Copied { .. }))
            .count()
    }

    /// Assets skipped because the destination already had them
    pub fn already_present(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| matches!(a.outcome, AssetOutcome::AlreadyPresent))
            .count()
    }

    /// Assets that failed to transfer
    pub fn failures(&self) -> impl Iterator<Item = &AssetReport> {
        self.assets.iter().filter(|a| !a.outcome.is_success())
    }

    /// Number of assets that failed to transfer
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Value of the `time` step output
    pub fn completion_time(&self) -> String {
        self.completed_at.format("%H:%M:%S GMT%z").to_string()
    }
}

/// Why a run did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source release is a draft
    Draft,
    /// The source release is a prerelease
    Prerelease,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Draft => f.write_str("draft"),
            SkipReason::Prerelease => f.write_str("prerelease"),
        }
    }
}

/// Result of a mirror run that did not fail outright
#[derive(Debug)]
pub enum MirrorOutcome {
    /// The source release is unpublished; nothing was touched
    Skipped {
        /// Tag that was looked up
        tag: String,
        /// Why it was skipped
        reason: SkipReason,
    },
    /// The release was mirrored (possibly with per-asset failures)
    Mirrored(MirrorReport),
}

impl MirrorOutcome {
    /// The report of a mirrored run
    pub fn report(&self) -> Option<&MirrorReport> {
        match self {
            MirrorOutcome::Mirrored(report) => Some(report),
            MirrorOutcome::Skipped { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn asset(name: &str) -> Asset {
        Asset {
            id: 1,
            name: name.to_string(),
            label: None,
            size: 3,
            content_type: "application/zip".to_string(),
            url: String::new(),
            browser_download_url: String::new(),
        }
    }

    fn release() -> Release {
        Release {
            id: 5,
            tag_name: "v1".to_string(),
            name: None,
            body: None,
            draft: false,
            prerelease: false,
            upload_url: String::new(),
            html_url: String::new(),
            assets: Vec::new(),
        }
    }

    #[test]
    fn test_counts() {
        let report = MirrorReport {
            tag: "v1".to_string(),
            destination: release(),
            created: true,
            assets: vec![
                AssetReport {
                    source: asset("a.zip"),
                    outcome: AssetOutcome::Copied {
                        uploaded: asset("a.zip"),
                    },
                },
                AssetReport {
                    source: asset("b.zip"),
                    outcome: AssetOutcome::AlreadyPresent,
                },
                AssetReport {
                    source: asset("c.zip"),
                    outcome: AssetOutcome::DownloadFailed(DownloadError::Fetch {
                        asset: "c.zip".to_string(),
                        url: "https://objects.example.com/c.zip".to_string(),
                        reason: "HTTP 500".to_string(),
                    }),
                },
            ],
            completed_at: Local::now(),
        };

        assert_eq!(report.copied(), 1);
        assert_eq!(report.already_present(), 1);
        assert_eq!(report.failed(), 1);
        let failure = report.failures().next().and_then(|a| a.outcome.failure());
        assert!(failure.unwrap_or_default().contains("objects.example.com/c.zip"));
    }

    #[test]
    fn test_size_conflict_is_a_failure() {
        let outcome = AssetOutcome::SizeConflict {
            existing: 1024,
            expected: 4096,
        };
        assert!(!outcome.is_success());
        let failure = outcome.failure().unwrap_or_default();
        assert!(failure.contains("1024 bytes"));
        assert!(failure.contains("expected 4096"));
    }

    #[test]
    fn test_completion_time_format() {
        let completed_at = Local
            .with_ymd_and_hms(2024, 3, 1, 14, 5, 9)
            .single()
            .expect("unambiguous local time");
        let report = MirrorReport {
            tag: "v1".to_string(),
            destination: release(),
            created: false,
            assets: Vec::new(),
            completed_at,
        };
        assert!(report.completion_time().starts_with("14:05:09 GMT"));
    }
}
