use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of download attempts (including the first).
    pub max_attempts: u32,
    /// Base of the exponential backoff: attempt `k` waits `backoff_base^k` seconds.
    pub backoff_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 1.5,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            backoff_base: self.backoff_base,
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Program names (or absolute paths) of the external agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub curl: PathBuf,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            curl: PathBuf::from("curl"),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Global configuration loaded from `~/.config/aiod/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiodConfig {
    /// Default download directory; when unset the interactive loop asks for one.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Downloads smaller than this are treated as an error page and deleted.
    pub min_media_bytes: u64,
    /// Constant bitrate handed to the MP3 encoder.
    pub audio_bitrate: String,
    /// Pre-answered "embed cover art?" prompt (None = ask).
    #[serde(default)]
    pub embed_cover: Option<bool>,
    /// Keep the pre-embed MP3 next to the `_cover.mp3` file.
    #[serde(default)]
    pub keep_original: bool,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for AiodConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            min_media_bytes: 50_000,
            audio_bitrate: "320k".to_string(),
            embed_cover: None,
            keep_original: false,
            retry: RetryConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("aiod")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AiodConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AiodConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AiodConfig = toml::from_str(&data)?;
    Ok(cfg)
}
