use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::summary::SummaryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener
    pub server: ServerConfig,

    /// Where videos, clips and the session document live
    pub paths: PathsConfig,

    /// Video download settings
    pub downloader: DownloaderConfig,

    /// Clip extraction settings
    pub clipper: ClipperConfig,

    /// Completion API and summary window policy
    pub summary: SummaryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Downloaded videos, one `<id>.mp4` per video
    pub videos_dir: PathBuf,

    /// Produced clips, served under `/download/`
    pub output_dir: PathBuf,

    /// YAML document holding every ingested video
    pub store_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// yt-dlp executable
    pub program: String,

    /// yt-dlp format selector
    pub format: String,

    /// Subtitle language requested from YouTube
    pub subtitle_lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipperConfig {
    /// ffmpeg executable
    pub program: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub base_url: String,
    pub model: String,

    /// Falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,

    /// Transcripts whose last line starts before this are summarized whole
    pub short_video_threshold_secs: f64,

    /// Lines skipped at the start of longer transcripts
    pub preamble_fragments: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            videos_dir: PathBuf::from("videos"),
            output_dir: PathBuf::from("data"),
            store_file: PathBuf::from("config.yaml"),
        }
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            format: "299+140".to_string(),
            subtitle_lang: "en".to_string(),
        }
    }
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        let policy = SummaryPolicy::default();
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            short_video_threshold_secs: policy.short_video_threshold_secs,
            preamble_fragments: policy.preamble_fragments,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            paths: PathsConfig::default(),
            downloader: DownloaderConfig::default(),
            clipper: ClipperConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("reelcut.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("reelcut").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }

        if self.downloader.program.trim().is_empty() {
            anyhow::bail!("downloader.program must be configured");
        }

        if self.clipper.program.trim().is_empty() {
            anyhow::bail!("clipper.program must be configured");
        }

        if self.summary.short_video_threshold_secs < 0.0 {
            anyhow::bail!("summary.short_video_threshold_secs must not be negative");
        }

        Ok(())
    }

    /// API key from the config file, else from the environment
    pub fn api_key(&self) -> Option<String> {
        self.summary
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    pub fn summary_policy(&self) -> SummaryPolicy {
        SummaryPolicy {
            short_video_threshold_secs: self.summary.short_video_threshold_secs,
            preamble_fragments: self.summary.preamble_fragments,
        }
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Listen: {}:{}", self.server.bind, self.server.port);
        println!("  Videos: {}", self.paths.videos_dir.display());
        println!("  Clips: {}", self.paths.output_dir.display());
        println!("  Session Document: {}", self.paths.store_file.display());
        println!("  Downloader: {} -f {}", self.downloader.program, self.downloader.format);
        println!("  Clipper: {}", self.clipper.program);
        println!("  Summary Model: {} ({})", self.summary.model, self.summary.base_url);
        println!(
            "  API Key: {}",
            if self.api_key().is_some() { "set" } else { "missing" }
        );
    }
}
