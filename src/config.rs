//! Server configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SITE_DIR: &str = ".";
pub const DEFAULT_CONTENT_DIR: &str = ".";
pub const DEFAULT_INDEX_FILE: &str = "information/index.json";
pub const DEFAULT_OVERVIEW_FILE: &str = "mini-context.md";
pub const DEFAULT_BOT_MAX_TOKENS: u32 = 2048;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Static website served at `/`.
    pub site_dir: PathBuf,
    /// Root that index, overview and section paths resolve against.
    pub content_dir: PathBuf,
    pub index_file: PathBuf,
    pub overview_file: PathBuf,
    pub max_tokens: u32,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// - `PORT`: default 5000
    /// - `SITE_DIR`: default `.`
    /// - `CONTENT_DIR`: default `.`
    /// - `INDEX_FILE`: default `information/index.json`
    /// - `OVERVIEW_FILE`: default `mini-context.md`
    /// - `BOT_MAX_TOKENS`: default 2048
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT)?,
            site_dir: env_path("SITE_DIR", DEFAULT_SITE_DIR),
            content_dir: env_path("CONTENT_DIR", DEFAULT_CONTENT_DIR),
            index_file: env_path("INDEX_FILE", DEFAULT_INDEX_FILE),
            overview_file: env_path("OVERVIEW_FILE", DEFAULT_OVERVIEW_FILE),
            max_tokens: env_parse("BOT_MAX_TOKENS", DEFAULT_BOT_MAX_TOKENS)?,
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).map_or_else(|_| PathBuf::from(default), PathBuf::from)
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
