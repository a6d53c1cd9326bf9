use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::{watch_url, SourceError, VideoMetadata, VideoSource};
use crate::process::{ProcessRunner, HTML_LINE_BREAK};
use crate::store::TranscriptFragment;

/// Metadata and transcripts through yt-dlp
pub struct YtDlpSource {
    runner: Arc<dyn ProcessRunner>,
    yt_dlp_path: String,
    subtitle_lang: String,
}

impl YtDlpSource {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            yt_dlp_path: "yt-dlp".to_string(),
            subtitle_lang: "en".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.yt_dlp_path = program.into();
        self
    }

    pub fn with_subtitle_lang(mut self, lang: impl Into<String>) -> Self {
        self.subtitle_lang = lang.into();
        self
    }

    /// Run yt-dlp and return its stdout with the runner's line-break markers undone
    async fn run_yt_dlp(&self, args: &[&str]) -> Result<String, SourceError> {
        let command: Vec<String> = std::iter::once(self.yt_dlp_path.as_str())
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();

        let output = self
            .runner
            .run(&command)
            .await
            .map_err(|source| SourceError::Spawn {
                program: self.yt_dlp_path.clone(),
                source,
            })?;

        if !output.success() {
            let stderr = output.stderr.replace(HTML_LINE_BREAK, "\n").trim().to_string();
            tracing::error!(stderr = %stderr, "yt-dlp failed");
            return Err(SourceError::Command {
                program: self.yt_dlp_path.clone(),
                stderr,
            });
        }

        Ok(output.stdout.replace(HTML_LINE_BREAK, "\n"))
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, video_id: &str) -> Result<Value, SourceError> {
        tracing::debug!("Extracting video info for: {}", video_id);

        let url = watch_url(video_id, None);
        let stdout = self
            .run_yt_dlp(&["--dump-json", "--skip-download", "--no-playlist", url.as_str()])
            .await?;

        serde_json::from_str(&stdout).map_err(|source| SourceError::Parse {
            what: "yt-dlp --dump-json",
            source,
        })
    }
}

#[async_trait]
impl VideoSource for YtDlpSource {
    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata, SourceError> {
        let info = self.get_video_info(video_id).await?;
        Ok(metadata_from_info(&info))
    }

    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptFragment>, SourceError> {
        let temp_dir = TempDir::new()?;
        let template = temp_dir.path().join("%(id)s.%(ext)s");
        let template = template.to_string_lossy().into_owned();
        let url = watch_url(video_id, None);

        tracing::info!("Fetching {} transcript for {}", self.subtitle_lang, video_id);

        self.run_yt_dlp(&[
            "--skip-download",
            "--no-playlist",
            "--write-subs",
            "--write-auto-subs",
            "--sub-langs",
            self.subtitle_lang.as_str(),
            "--sub-format",
            "json3",
            "--output",
            template.as_str(),
            url.as_str(),
        ])
        .await?;

        let subtitle_path = find_subtitle_file(temp_dir.path())?
            .ok_or_else(|| SourceError::NoTranscript(video_id.to_string()))?;

        let content = fs_err::read(&subtitle_path)?;
        let fragments = parse_json3(&content)?;

        tracing::info!("Fetched {} transcript lines for {}", fragments.len(), video_id);
        Ok(fragments)
    }
}

fn metadata_from_info(info: &Value) -> VideoMetadata {
    let title = info["title"].as_str().unwrap_or_default().to_string();
    let publish_date = info["upload_date"]
        .as_str()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok());

    VideoMetadata {
        title,
        publish_date,
    }
}

fn find_subtitle_file(dir: &Path) -> Result<Option<PathBuf>, SourceError> {
    let mut candidates: Vec<PathBuf> = fs_err::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json3"))
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Transcript fragments from a YouTube `json3` subtitle document.
///
/// Events carrying no text (window setup, bare line breaks) are dropped.
pub fn parse_json3(content: &[u8]) -> Result<Vec<TranscriptFragment>, SourceError> {
    let document: Json3Document =
        serde_json::from_slice(content).map_err(|source| SourceError::Parse {
            what: "json3 subtitle",
            source,
        })?;

    Ok(document
        .events
        .into_iter()
        .filter_map(|event| {
            let raw: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            Some(TranscriptFragment::new(
                event.t_start_ms as f64 / 1000.0,
                event.d_duration_ms as f64 / 1000.0,
                text,
            ))
        })
        .collect())
}
