//! Run configuration.
//!
//! The process environment is read exactly once into an [`EnvConfig`]
//! snapshot. Everything after that works from the explicit [`MirrorConfig`].

use crate::cli::{Args, RetryConfig};
use crate::error::{CliError, MirrorError, Result};
use crate::github::{DEFAULT_API_URL, ReleaseRef, RepoRef};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default number of concurrent asset transfers
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build a snapshot from explicit key/value pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Non-blank value of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Triggering workflow event, as described by the runner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventConfig {
    /// `GITHUB_EVENT_NAME`, e.g. `push` or `release`
    pub name: Option<String>,
    /// `GITHUB_EVENT_PATH`, the JSON payload file
    pub path: Option<PathBuf>,
}

/// Everything a mirror run needs, resolved up front
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Repository releases are copied from
    pub source: RepoRef,
    /// Repository releases are copied to
    pub destination: RepoRef,
    /// Tag to mirror
    pub tag: String,
    /// API credential
    pub token: String,
    /// GitHub API base URL
    pub api_url: String,
    /// Number of concurrent asset transfers
    pub max_concurrency: usize,
    /// Transport retry tuning
    pub retry: RetryConfig,
    /// Triggering event metadata
    pub event: EventConfig,
    /// `GITHUB_OUTPUT` file for step outputs
    pub output_file: Option<PathBuf>,
}

impl MirrorConfig {
    /// Resolve parsed arguments against the environment snapshot
    ///
    /// Explicit inputs win; `tag` falls back to `GITHUB_REF` and the token to
    /// `GITHUB_TOKEN` then `GH_TOKEN`.
    pub fn resolve(args: &Args, env: &EnvConfig) -> Result<Self> {
        let source = RepoRef::parse(&required(args.source_repo.as_deref(), "source_repo")?)?;
        let destination =
            RepoRef::parse(&required(args.destination_repo.as_deref(), "destination_repo")?)?;

        let reference = non_blank(args.tag.as_deref())
            .or_else(|| env.get("GITHUB_REF"))
            .ok_or_else(|| {
                MirrorError::Cli(CliError::MissingArgument {
                    argument: "tag".to_string(),
                })
            })?;
        let tag = parse_tag(&reference)?;

        let token = non_blank(args.github_token.as_deref())
            .or_else(|| env.get("GITHUB_TOKEN"))
            .or_else(|| env.get("GH_TOKEN"))
            .ok_or_else(|| {
                MirrorError::Cli(CliError::MissingArgument {
                    argument: "github_token".to_string(),
                })
            })?;

        let api_url = non_blank(args.api_url.as_deref())
            .or_else(|| env.get("GITHUB_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if args.max_concurrency == Some(0) {
            return Err(MirrorError::Cli(CliError::InvalidArguments {
                reason: "max_concurrency must be at least 1".to_string(),
            }));
        }

        let retry = RetryConfig::from_env(env);

        Ok(Self {
            source,
            destination,
            tag,
            token,
            api_url,
            max_concurrency: args.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY),
            retry,
            event: EventConfig {
                name: env.get("GITHUB_EVENT_NAME"),
                path: env.get("GITHUB_EVENT_PATH").map(PathBuf::from),
            },
            output_file: env.get("GITHUB_OUTPUT").map(PathBuf::from),
        })
    }

    /// The release being mirrored
    pub fn source_release(&self) -> ReleaseRef {
        ReleaseRef {
            repo: self.source.clone(),
            tag: self.tag.clone(),
        }
    }

    /// Where the release is mirrored to
    pub fn destination_release(&self) -> ReleaseRef {
        ReleaseRef {
            repo: self.destination.clone(),
            tag: self.tag.clone(),
        }
    }
}

/// Extract the tag from a ref: `refs/tags/v1.2.3` becomes `v1.2.3`
///
/// Plain tags pass through unchanged.
pub fn parse_tag(reference: &str) -> Result<String> {
    let tag = reference.trim().rsplit('/').next().unwrap_or_default();
    if tag.is_empty() {
        return Err(MirrorError::Cli(CliError::InvalidArguments {
            reason: format!("Could not extract a tag from ref '{}'", reference),
        }));
    }
    Ok(tag.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required(value: Option<&str>, argument: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| {
        MirrorError::Cli(CliError::MissingArgument {
            argument: argument.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            source_repo: Some("cyrup-ai/kodegen".to_string()),
            destination_repo: Some("cyrup-ai/kodegen-releases".to_string()),
            tag: None,
            github_token: None,
            max_concurrency: None,
            api_url: None,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_tag_from_ref() {
        assert_eq!(parse_tag("refs/tags/v1.2.3").unwrap(), "v1.2.3");
        assert_eq!(parse_tag("v1.2.3").unwrap(), "v1.2.3");
        assert_eq!(parse_tag(" refs/tags/nightly ").unwrap(), "nightly");
    }

    #[test]
    fn test_parse_tag_rejects_empty() {
        assert!(parse_tag("").is_err());
        assert!(parse_tag("refs/tags/").is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_environment() {
        let env = EnvConfig::from_pairs([
            ("GITHUB_REF", "refs/tags/v0.4.0"),
            ("GITHUB_TOKEN", "ambient"),
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_EVENT_PATH", "/tmp/event.json"),
            ("GITHUB_OUTPUT", "/tmp/output"),
        ]);

        let config = MirrorConfig::resolve(&args(), &env).expect("resolves");
        assert_eq!(config.source, RepoRef::new("cyrup-ai", "kodegen"));
        assert_eq!(config.destination, RepoRef::new("cyrup-ai", "kodegen-releases"));
        assert_eq!(config.tag, "v0.4.0");
        assert_eq!(config.token, "ambient");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert_eq!(config.event.name.as_deref(), Some("push"));
        assert_eq!(config.output_file, Some(PathBuf::from("/tmp/output")));
        assert_eq!(config.source_release().to_string(), "cyrup-ai/kodegen@v0.4.0");
    }

    #[test]
    fn test_explicit_inputs_win() {
        let env = EnvConfig::from_pairs([
            ("GITHUB_REF", "refs/heads/main"),
            ("GITHUB_TOKEN", "ambient"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
        ]);
        let mut args = args();
        args.tag = Some("v9.9.9".to_string());
        args.github_token = Some("explicit".to_string());
        args.max_concurrency = Some(2);

        let config = MirrorConfig::resolve(&args, &env).expect("resolves");
        assert_eq!(config.tag, "v9.9.9");
        assert_eq!(config.token, "explicit");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.max_concurrency, 2);
    }

    #[test]
    fn test_blank_inputs_are_absent() {
        let env = EnvConfig::from_pairs([("GITHUB_REF", "refs/tags/v1"), ("GH_TOKEN", "gh")]);
        let mut args = args();
        args.tag = Some("   ".to_string());
        args.github_token = Some(String::new());

        let config = MirrorConfig::resolve(&args, &env).expect("resolves");
        assert_eq!(config.tag, "v1");
        assert_eq!(config.token, "gh");
    }

    #[test]
    fn test_missing_required_inputs() {
        let env = EnvConfig::from_pairs([("GITHUB_REF", "refs/tags/v1"), ("GITHUB_TOKEN", "t")]);

        let mut no_source = args();
        no_source.source_repo = None;
        let err = MirrorConfig::resolve(&no_source, &env).unwrap_err();
        assert!(err.to_string().contains("source_repo"));

        let no_token = EnvConfig::from_pairs([("GITHUB_REF", "refs/tags/v1")]);
        let err = MirrorConfig::resolve(&args(), &no_token).unwrap_err();
        assert!(err.to_string().contains("github_token"));

        let no_ref = EnvConfig::from_pairs([("GITHUB_TOKEN", "t")]);
        let err = MirrorConfig::resolve(&args(), &no_ref).unwrap_err();
        assert!(err.to_string().contains("tag"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let env = EnvConfig::from_pairs([("GITHUB_REF", "refs/tags/v1"), ("GITHUB_TOKEN", "t")]);
        let mut args = args();
        args.max_concurrency = Some(0);
        assert!(MirrorConfig::resolve(&args, &env).is_err());
    }
}
