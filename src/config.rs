use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::error::MrLensError;

pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";
pub const DEFAULT_REMOTE_NAME: &str = "origin";

/// Configuration file structure for mrlens.
///
/// Every field is optional; values given on the command line or through the
/// environment take precedence over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub git: GitConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// Full REST API base URL (e.g. `https://gitlab.example.com/api/v4`)
    pub api_url: Option<String>,

    /// GitLab instance URL; `/api/v4` is appended
    pub host: Option<String>,

    /// GitLab personal access token
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitConfig {
    /// Remote used to fetch merge request branches
    pub remote_name: Option<String>,
}

impl FileConfig {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./mrlens.toml
    /// 3. ./mrlens.json
    /// 4. ./mrlens.yaml
    /// 5. ./mrlens.yml
    /// 6. `<config dir>/mrlens/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let mut candidates: Vec<PathBuf> =
            ["mrlens.toml", "mrlens.json", "mrlens.yaml", "mrlens.yml"]
                .iter()
                .map(PathBuf::from)
                .collect();

        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("mrlens").join("config.toml"));
        }

        for candidate in &candidates {
            if candidate.exists() {
                return Self::load_from_path(candidate);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

/// Values supplied on the command line or through environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub host: Option<String>,
    pub token: Option<String>,
    pub remote_name: Option<String>,
}

/// Resolved settings handed to the GitLab client and the git wrapper.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token: Token,
    pub remote_name: String,
}

impl Settings {
    /// Merges overrides with the file configuration.
    ///
    /// # Errors
    ///
    /// Returns `MrLensError::Config` when no token is available from either source.
    pub fn resolve(overrides: Overrides, file: FileConfig) -> crate::error::Result<Self> {
        let api_url = resolve_api_url(overrides.api_url.as_deref(), overrides.host.as_deref())
            .or_else(|| {
                resolve_api_url(file.gitlab.api_url.as_deref(), file.gitlab.host.as_deref())
            })
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token = non_empty(overrides.token.as_deref())
            .or_else(|| non_empty(file.gitlab.token.as_deref()))
            .map(Token::from)
            .ok_or_else(|| {
                MrLensError::Config("GITLAB_TOKEN environment variable is required.".to_string())
            })?;

        let remote_name = non_empty(overrides.remote_name.as_deref())
            .or_else(|| non_empty(file.git.remote_name.as_deref()))
            .unwrap_or(DEFAULT_REMOTE_NAME)
            .to_string();

        Ok(Self {
            api_url,
            token,
            remote_name,
        })
    }
}

/// Builds the REST base URL from an explicit URL or an instance host.
///
/// The explicit URL wins; a host gets `/api/v4` appended. Trailing slashes are
/// stripped and blank values are ignored.
pub fn resolve_api_url(explicit: Option<&str>, host: Option<&str>) -> Option<String> {
    if let Some(explicit) = non_empty(explicit) {
        return Some(explicit.trim_end_matches('/').to_string());
    }

    non_empty(host).map(|host| format!("{}/api/v4", host.trim_end_matches('/')))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
