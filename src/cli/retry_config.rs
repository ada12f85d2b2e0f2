//! Retry configuration for GitHub API requests.
//!
//! The transport retries transient failures on its own; this only tunes how
//! many times it tries.

use crate::EnvConfig;

/// Upper bound for the GitHub API retry count
const MAX_GITHUB_RETRIES: u32 = 10;

/// Configuration for retry behavior of the GitHub transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Max retries for GitHub API calls (list, create, upload, asset lookup)
    pub github_api: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { github_api: 3 }
    }
}

impl RetryConfig {
    /// Parse retry count from an environment variable with clamping to maximum
    ///
    /// # Arguments
    /// * `env` - Environment snapshot
    /// * `var_name` - Environment variable name (e.g., "MIRROR_RETRY_GITHUB")
    /// * `default` - Default value if variable is not set or invalid
    /// * `max` - Maximum allowed value (values above this are clamped)
    fn parse_retry_env(env: &EnvConfig, var_name: &str, default: u32, max: u32) -> u32 {
        env.get(var_name)
            .and_then(|s| s.trim().parse::<u32>().ok())
            .map(|v| v.min(max))
            .unwrap_or(default)
    }

    /// Create config from environment variables with fallback to defaults
    pub fn from_env(env: &EnvConfig) -> Self {
        Self {
            github_api: Self::parse_retry_env(env, "MIRROR_RETRY_GITHUB", 3, MAX_GITHUB_RETRIES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let env = EnvConfig::from_pairs(Vec::<(String, String)>::new());
        assert_eq!(RetryConfig::from_env(&env), RetryConfig::default());
    }

    #[test]
    fn test_clamps_to_max() {
        let env = EnvConfig::from_pairs([("MIRROR_RETRY_GITHUB", "99")]);
        let config = RetryConfig::from_env(&env);
        assert_eq!(config.github_api, MAX_GITHUB_RETRIES);
    }

    #[test]
    fn test_invalid_value_falls_back() {
        let env = EnvConfig::from_pairs([("MIRROR_RETRY_GITHUB", "lots")]);
        assert_eq!(RetryConfig::from_env(&env).github_api, 3);
    }
}
