//! Deployment configuration.
//!
//! Settings come from an optional TOML file; the bearer token only ever comes
//! from the environment (`CODESANDBOX_API_TOKEN`) or from the caller.

use crate::sandbox::title::DEFAULT_TITLE_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the CodeSandbox API token.
pub const TOKEN_ENV: &str = "CODESANDBOX_API_TOKEN";

pub const DEFAULT_API_URL: &str = "https://codesandbox.io/api/v1/sandboxes/define?json=1";
pub const DEFAULT_EMBED_BASE_URL: &str = "https://codesandbox.io/embed";
pub const DEFAULT_SHARE_BASE_URL: &str = "https://codesandbox.io/s";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Sandbox "define" endpoint.
    pub api_url: String,
    /// Base for embed URLs, `<base>/<id>?…`.
    pub embed_base_url: String,
    /// Base for share URLs, `<base>/<id>`.
    pub share_base_url: String,
    /// Total request budget (connect + read), in seconds.
    pub timeout_secs: u64,
    /// Prefix of synthesized sandbox titles.
    pub title_prefix: String,
    pub user_agent: String,
    #[serde(skip)]
    pub api_token: Option<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            embed_base_url: DEFAULT_EMBED_BASE_URL.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            user_agent: concat!("codesandbox-deploy/", env!("CARGO_PKG_VERSION")).to_string(),
            api_token: None,
        }
    }
}

impl DeployConfig {
    /// Defaults plus the token from the environment.
    pub fn from_env() -> Self {
        Self::default().with_env_token()
    }

    /// Load settings from `path`, or from the platform config file when
    /// `path` is `None`. A missing default file yields defaults; a missing
    /// explicit file is an error. The token is then read from the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(raw) => {
                let path = expand_path(raw)?;
                Self::from_file(&path)?
            }
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        Ok(config.with_env_token())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        anyhow::ensure!(config.timeout_secs > 0, "timeout_secs must be greater than 0");
        Ok(config)
    }

    /// Set the token; empty strings count as no token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Take the token from [`TOKEN_ENV`] when it is set.
    pub fn with_env_token(self) -> Self {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => self.with_token(Some(token)),
            _ => self,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `<config dir>/codesandbox-deploy/config.toml` for the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "codesandbox", "codesandbox-deploy")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| anyhow::anyhow!("Failed to expand config path {raw}: {e}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_codesandbox() {
        let config = DeployConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.title_prefix, "Shopping App");
        assert!(config.api_token.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DeployConfig::from_toml("timeout_secs = 5\ntitle_prefix = \"Demo\"").unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.title_prefix, "Demo");
        assert_eq!(config.share_base_url, DEFAULT_SHARE_BASE_URL);
    }

    #[test]
    fn token_is_not_read_from_toml() {
        let err = DeployConfig::from_toml("api_token = \"secret\"").unwrap_err();
        assert!(err.to_string().contains("api_token"));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(DeployConfig::from_toml("retries = 3").is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(DeployConfig::from_toml("timeout_secs = 0").is_err());
    }

    #[test]
    fn empty_token_counts_as_none() {
        let config = DeployConfig::default().with_token(Some("  ".into()));
        assert!(config.api_token.is_none());
        let config = DeployConfig::default().with_token(Some("csb_v1_test".into()));
        assert_eq!(config.api_token.as_deref(), Some("csb_v1_test"));
    }

    #[test]
    fn load_reads_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deploy.toml");
        std::fs::write(&path, "share_base_url = \"http://localhost/s\"").unwrap();

        let config = DeployConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.share_base_url, "http://localhost/s");
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.toml");
        assert!(DeployConfig::load(Some(path.to_str().unwrap())).is_err());
    }
}
