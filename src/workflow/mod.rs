//! The three stages a video goes through: ingest, select and extract.
//!
//! Each video moves independently from "not ingested" to "ingested" and can
//! then be selected from and clipped any number of times. Ingesting again
//! replaces the record wholesale.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod commands;

use crate::config::Config;
use crate::extractors::{normalize_video_id, watch_url, SourceError, VideoSource, YtDlpSource};
use crate::process::{describe, CommandOutput, CommandRunner, ProcessRunner};
use crate::selection::{resolve, selection_label, ClipRange, SelectionError};
use crate::store::{SessionStore, StoreError, VideoRecord};
use crate::summary::{OpenAiSummarizer, Summarizer, SummaryError, SummaryPolicy};
use crate::utils::{format_timestamp, remove_file_if_exists};

/// Container extension for downloads and clips
pub const MEDIA_EXTENSION: &str = "mp4";

#[derive(thiserror::Error, Debug)]
pub enum WorkflowError {
    /// The program ran and exited non-zero; its output is kept verbatim
    #[error("Command {command} failed:\n{stdout}\n{stderr}")]
    ExternalProcess {
        command: String,
        stdout: String,
        stderr: String,
    },

    #[error("Failed to start command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Unknown video: {0}")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to summarize transcript: {0}")]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Store(StoreError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => WorkflowError::NotFound(id),
            other => WorkflowError::Store(other),
        }
    }
}

/// Fixed inputs of the workflow
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub videos_dir: PathBuf,
    pub output_dir: PathBuf,
    pub downloader: String,
    pub download_format: String,
    pub clipper: String,
    pub summary_policy: SummaryPolicy,
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            videos_dir: config.paths.videos_dir.clone(),
            output_dir: config.paths.output_dir.clone(),
            downloader: config.downloader.program.clone(),
            download_format: config.downloader.format.clone(),
            clipper: config.clipper.program.clone(),
            summary_policy: config.summary_policy(),
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of a successful ingest
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedVideo {
    pub video_id: String,
    pub record: VideoRecord,
}

/// One pickable transcript line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionEntry {
    /// `"{start}_{end}"`, what the picker submits back
    pub label: String,
    pub start: i64,
    pub timestamp: String,
    pub text: String,
    pub watch_url: String,
}

/// Everything the fragment picker shows for a video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub entries: Vec<SelectionEntry>,
}

/// A produced clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipArtifact {
    /// Name under the output directory, as served by `/download/`
    pub file_name: String,
    pub path: PathBuf,
    pub range: ClipRange,
}

/// Drives ingest, select and extract over a shared [`SessionStore`]
pub struct Orchestrator {
    settings: WorkflowSettings,
    store: RwLock<SessionStore>,
    runner: Arc<dyn ProcessRunner>,
    source: Arc<dyn VideoSource>,
    summarizer: Arc<dyn Summarizer>,
}

impl Orchestrator {
    pub fn new(
        settings: WorkflowSettings,
        store: SessionStore,
        runner: Arc<dyn ProcessRunner>,
        source: Arc<dyn VideoSource>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            settings,
            store: RwLock::new(store),
            runner,
            source,
            summarizer,
        }
    }

    /// Wire up the real collaborators and load the session document
    pub fn from_config(config: &Config) -> Self {
        let api_key = config.api_key();
        if api_key.is_none() {
            tracing::warn!("No completion API key configured; ingest will fail at the summary step");
        }

        let runner: Arc<dyn ProcessRunner> = Arc::new(CommandRunner::new());
        let source = YtDlpSource::new(Arc::clone(&runner))
            .with_program(&config.downloader.program)
            .with_subtitle_lang(&config.downloader.subtitle_lang);
        let summarizer = OpenAiSummarizer::new(api_key, &config.summary.model)
            .with_base_url(&config.summary.base_url);

        Self::new(
            WorkflowSettings::from_config(config),
            SessionStore::load(&config.paths.store_file),
            runner,
            Arc::new(source),
            Arc::new(summarizer),
        )
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Where the download for `video_id` lands
    pub fn video_path(&self, video_id: &str) -> PathBuf {
        self.settings
            .videos_dir
            .join(format!("{video_id}.{MEDIA_EXTENSION}"))
    }

    /// Download, fetch transcript and metadata, summarize, store.
    ///
    /// Nothing is stored unless every step succeeds.
    pub async fn ingest(&self, reference: &str) -> Result<IngestedVideo, WorkflowError> {
        let video_id = normalize_video_id(reference)?;
        let file_path = self.video_path(&video_id);

        if remove_file_if_exists(&file_path)? {
            tracing::info!("Removed previous download {}", file_path.display());
        }

        let command = commands::download_command(
            &self.settings.downloader,
            &self.settings.download_format,
            &file_path,
            &video_id,
        );
        self.run_checked(&command).await?;

        let metadata = self.source.metadata(&video_id).await?;
        let transcript = self.source.transcript(&video_id).await?;

        let policy = self.settings.summary_policy;
        tracing::info!(
            "Getting summary for {} using index {}",
            video_id,
            policy.start_index(&transcript)
        );
        let summary = self.summarizer.summarize(policy.window(&transcript)).await?;

        let record = VideoRecord {
            file_path,
            title: metadata.title,
            publish_date: metadata.publish_date,
            transcript,
            summary,
        };

        self.store.write().await.put(video_id.clone(), record.clone())?;
        tracing::info!("Ingested video {}: {}", video_id, record.title);

        Ok(IngestedVideo { video_id, record })
    }

    /// Rendering model for picking a range out of `video_id`'s transcript
    pub async fn select(&self, video_id: &str) -> Result<SelectionView, WorkflowError> {
        let store = self.store.read().await;
        let record = store.get(video_id)?;

        let entries = record
            .transcript
            .iter()
            .map(|fragment| {
                let start = fragment.start_second();
                SelectionEntry {
                    label: selection_label(fragment),
                    start,
                    timestamp: format_timestamp(start),
                    text: fragment.text.clone(),
                    watch_url: watch_url(video_id, Some(start)),
                }
            })
            .collect();

        Ok(SelectionView {
            video_id: video_id.to_string(),
            title: record.title.clone(),
            summary: record.summary.clone(),
            entries,
        })
    }

    /// Cut the range spanned by two selected lines out of the download
    pub async fn extract<S: AsRef<str>>(
        &self,
        video_id: &str,
        selected: &[S],
    ) -> Result<ClipArtifact, WorkflowError> {
        let source_file = self.store.read().await.get(video_id)?.file_path.clone();

        let range = resolve(selected)
            .inspect_err(|e| tracing::warn!(error = %e, video_id, "Rejected selection"))?;

        let file_name = format!("{video_id}_{range}.{MEDIA_EXTENSION}");
        let path = self.settings.output_dir.join(&file_name);
        fs_err::create_dir_all(&self.settings.output_dir)?;

        tracing::info!(
            "Clipping {} from {}s for {}s",
            source_file.display(),
            range.start_second,
            range.padded_duration()
        );

        let command = commands::clip_command(&self.settings.clipper, &source_file, range, &path);
        self.run_checked(&command).await?;

        Ok(ClipArtifact {
            file_name,
            path,
            range,
        })
    }

    /// Every known video, ordered by id
    pub async fn videos(&self) -> BTreeMap<String, VideoRecord> {
        self.store.read().await.snapshot_all()
    }

    async fn run_checked(&self, command: &[String]) -> Result<CommandOutput, WorkflowError> {
        let output = self
            .runner
            .run(command)
            .await
            .map_err(|source| WorkflowError::Spawn {
                command: describe(command),
                source,
            })?;

        if !output.success() {
            tracing::error!(
                exit_code = output.exit_code,
                "Command {} failed",
                describe(command)
            );
            return Err(WorkflowError::ExternalProcess {
                command: describe(command),
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}
