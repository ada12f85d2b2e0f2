//! Error types for release mirroring.
//!
//! Run-fatal failures surface as [`MirrorError`]. Per-asset failures are kept
//! as [`DownloadError`] or [`GitHubError`] values inside the mirror report so a
//! single broken asset never aborts its siblings.

use thiserror::Error;

/// Result type alias for release mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Main error type for all release mirror operations
#[derive(Error, Debug)]
pub enum MirrorError {
    /// CLI argument and input errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// GitHub API errors
    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more assets could not be copied
    #[error("{failed} asset(s) failed to copy")]
    AssetTransfer {
        /// Number of failed assets
        failed: usize,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Input required and not supplied: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

/// Errors talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (network, DNS, TLS, timeout)
    #[error("{operation} request failed: {source}")]
    Request {
        /// API operation being performed
        operation: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// GitHub answered with a non-success status
    #[error("{operation} failed ({status}): {message}")]
    Api {
        /// API operation being performed
        operation: String,
        /// HTTP status code
        status: u16,
        /// Message from the response body
        message: String,
    },

    /// The response could not be interpreted
    #[error("{operation} returned an invalid response: {reason}")]
    InvalidResponse {
        /// API operation being performed
        operation: String,
        /// Reason for the error
        reason: String,
    },
}

impl GitHubError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            GitHubError::Request { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            GitHubError::Api { status, .. } => *status == 429 || *status >= 500,
            GitHubError::Client(_) | GitHubError::InvalidResponse { .. } => false,
        }
    }

    /// HTTP status of an API error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure fetching the bytes of one source asset
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The transient download URL could not be obtained
    #[error("Failed to resolve download URL for {asset}: {source}")]
    Resolve {
        /// Asset name
        asset: String,
        /// Underlying API error
        #[source]
        source: GitHubError,
    },

    /// Fetching the content failed
    #[error("Fail to download file {url}: {reason}")]
    Fetch {
        /// Asset name
        asset: String,
        /// URL that was being fetched
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// The downloaded length does not match the source asset size
    #[error("Downloaded {actual} bytes from {url}, expected {expected}")]
    SizeMismatch {
        /// Asset name
        asset: String,
        /// URL that was fetched
        url: String,
        /// Size reported by the source release
        expected: u64,
        /// Bytes actually received
        actual: u64,
    },
}

impl DownloadError {
    /// Name of the asset that failed
    pub fn asset(&self) -> &str {
        match self {
            DownloadError::Resolve { asset, .. }
            | DownloadError::Fetch { asset, .. }
            | DownloadError::SizeMismatch { asset, .. } => asset,
        }
    }
}

impl MirrorError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            MirrorError::Cli(CliError::MissingArgument { argument }) => vec![
                format!("Provide '{}' in the workflow step's `with:` block", argument),
                format!("Or pass --{} on the command line", argument.replace('_', "-")),
            ],
            MirrorError::GitHub(err) => match err.status() {
                Some(401) => vec![
                    "Check that the token is valid and not expired".to_string(),
                    "Set github_token or the GITHUB_TOKEN environment variable".to_string(),
                ],
                Some(403) => vec![
                    "The token needs `contents: write` on the destination repository".to_string(),
                    "The default GITHUB_TOKEN cannot write to other repositories; use a PAT"
                        .to_string(),
                ],
                Some(404) => vec![
                    "Verify that the repository names are spelled owner/name".to_string(),
                    "Verify that a published release exists for the tag".to_string(),
                    "Private repositories return 404 when the token lacks access".to_string(),
                ],
                _ => vec!["Check the error message above for specific details".to_string()],
            },
            MirrorError::AssetTransfer { .. } => vec![
                "Re-run the mirror; assets already copied are skipped".to_string(),
                "Delete destination assets reported with a size conflict before re-running"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
