// Configuration loading for cos-upload

use anyhow::{anyhow, Context, Result};
use cos_upload::CosObjectStoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// cos-upload configuration
///
/// Credentials are not part of the file; they always come from the environment.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UploadToolConfig {
    /// Object storage connection settings
    #[serde(default)]
    pub store: CosObjectStoreConfig,
}

impl UploadToolConfig {
    /// Load configuration from file
    ///
    /// An explicitly given file must exist. When no path is given the default
    /// location is used if present, otherwise built-in defaults apply.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = match config_path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).to_string()),
            None => {
                let path = Self::default_config_path()?;
                if !path.exists() {
                    log::debug!("no config file at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        if !path.exists() {
            return Err(anyhow!("Config file not found: {}", path.display()));
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration content, expanding `${VAR}` references first
    pub fn parse(content: &str) -> Result<Self> {
        let expanded_content = Self::expand_env_vars(content)?;

        // An empty file deserializes to null
        if expanded_content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&expanded_content)?;
        Ok(config)
    }

    /// Get default config path (~/.cos-upload/config.yaml)
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".cos-upload").join("config.yaml"))
    }

    /// Expand environment variables in the format ${VAR_NAME}
    fn expand_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();
        let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let full_match = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(full_match, &value);
            }
        }

        Ok(result)
    }
}
