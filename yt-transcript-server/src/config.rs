//! Server configuration: CLI arguments plus an optional TOML file.
//!
//! CLI flags win over file values; file values win over defaults.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use yt_transcript_lib::{CacheConfig, DEFAULT_WATCH_BASE};

use crate::error::{Result, ServerError};

/// Transcript window service configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "yt-transcript-server")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the server to.
    #[arg(short = 'b', long, default_value = "127.0.0.1:8099")]
    pub bind: SocketAddr,

    /// Optional TOML configuration file.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Watch-page base URL (override to point at a proxy).
    #[arg(long, default_value = DEFAULT_WATCH_BASE)]
    pub youtube_url: String,

    /// OpenAI API key for the annotation endpoint.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

/// Configuration file format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Cache settings.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    /// OpenAI settings.
    #[serde(default)]
    pub openai: OpenAiSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiSettings {
    /// API key; the CLI flag or environment variable wins over this.
    pub api_key: Option<String>,
    /// Chat-completions endpoint override.
    pub endpoint: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| ServerError::Config(e.to_string()))
    }
}

/// Runtime configuration assembled from CLI args and the optional file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub youtube_url: String,
    pub cache: CacheConfig,
    pub openai_api_key: Option<String>,
    pub openai_endpoint: Option<String>,
}

impl AppConfig {
    /// Merge CLI args with a parsed config file.
    pub fn from_sources(args: Args, file: ConfigFile) -> Self {
        Self {
            bind: args.bind,
            youtube_url: args.youtube_url,
            cache: file.cache.unwrap_or_default(),
            openai_api_key: args.openai_api_key.or(file.openai.api_key),
            openai_endpoint: file.openai.endpoint,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.youtube_url.starts_with("http://") && !self.youtube_url.starts_with("https://") {
            return Err(ServerError::Config(
                "youtube URL must start with http:// or https://".to_string(),
            ));
        }
        if let Some(endpoint) = &self.openai_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ServerError::Config(
                    "OpenAI endpoint must start with http:// or https://".to_string(),
                ));
            }
        }
        if let Some(key) = &self.openai_api_key {
            if key.trim().is_empty() {
                return Err(ServerError::Config(
                    "OpenAI API key must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}
