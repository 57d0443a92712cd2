//! CLI configuration (`config.toml`).

use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::Deserialize;
use sheetfeed_core::FeedEndpoints;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

pub const TOKEN_ENV: &str = "SHEETFEED_TOKEN";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub base_url: Option<String>,
    pub access_token: Option<String>,
    pub default_rows: Option<u32>,
    pub default_cols: Option<u32>,
}

impl Config {
    pub fn endpoints(&self) -> FeedEndpoints {
        match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => FeedEndpoints::new(url),
            _ => FeedEndpoints::default(),
        }
    }
}

/// Load the config from `config_file` or the user config dir.
///
/// Never fails: problems are returned as warnings and defaults are used.
/// `SHEETFEED_TOKEN` overrides `access_token`.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);
    let mut config = Config::default();

    if let Some(path) = config_path.as_ref() {
        if path.exists() {
            match read_config_file(path) {
                Ok(parsed) => config = parsed,
                Err(err) => warnings.push(err.to_string()),
            }
        } else if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    if let Ok(token) = std::env::var(TOKEN_ENV)
        && !token.trim().is_empty()
    {
        config.access_token = Some(token.trim().to_string());
    }

    (config, warnings)
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(ConfigError::TooLarge {
            path: path.display().to_string(),
            size: meta.len(),
            max: MAX_CONFIG_FILE_BYTES,
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content).map_err(|source| ConfigError::Toml {
        path: path.display().to_string(),
        source,
    })
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetfeed")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
