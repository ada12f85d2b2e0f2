//! Command line argument parsing.
//!
//! Every flag doubles as a GitHub Actions input: the runner exports inputs as
//! `INPUT_<NAME>` environment variables, which clap picks up directly.

use clap::Parser;

/// Mirror a published GitHub release into another repository
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "kodegen_release_mirror",
    version,
    about = "Mirror a published GitHub release and its assets into another repository",
    long_about = "Copy a release (title, notes, flags and every asset) from one GitHub repository
to another. Draft and prerelease releases are never mirrored.

Usage:
  kodegen_release_mirror --source-repo cyrup-ai/kodegen --destination-repo cyrup-ai/kodegen-dist --tag v1.2.3

Inside GitHub Actions the inputs source_repo, destination_repo, tag and
github_token are read from the step's `with:` block."
)]
pub struct Args {
    /// Repository to copy from (owner/name)
    #[arg(long, env = "INPUT_SOURCE_REPO", value_name = "OWNER/NAME")]
    pub source_repo: Option<String>,

    /// Repository to copy to (owner/name)
    #[arg(long, env = "INPUT_DESTINATION_REPO", value_name = "OWNER/NAME")]
    pub destination_repo: Option<String>,

    /// Tag or ref to mirror (defaults to GITHUB_REF)
    #[arg(long, env = "INPUT_TAG")]
    pub tag: Option<String>,

    /// GitHub token (defaults to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Maximum number of assets transferred at once
    #[arg(long, env = "INPUT_MAX_CONCURRENCY", value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// GitHub API base URL (defaults to GITHUB_API_URL, then https://api.github.com)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Only print errors
    #[arg(long, short)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == Some(0) {
            return Err("--max-concurrency must be at least 1".to_string());
        }

        if let Some(url) = &self.api_url
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            return Err(format!("--api-url must be an http(s) URL, got '{}'", url));
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}
