use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptFragment {
    pub text: String,

    /// Offset from the start of the video, in seconds
    pub start: f64,

    /// Seconds the entry stays on screen
    pub duration: f64,
}

impl TranscriptFragment {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// Start truncated to whole seconds
    pub fn start_second(&self) -> i64 {
        self.start as i64
    }

    /// `start + duration` truncated to whole seconds
    pub fn end_second(&self) -> i64 {
        (self.start + self.duration) as i64
    }
}

/// Everything known about an ingested video.
///
/// Serialized field names are kept stable so existing documents keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoRecord {
    #[serde(rename = "file")]
    pub file_path: PathBuf,

    #[serde(rename = "name")]
    pub title: String,

    #[serde(default)]
    pub publish_date: Option<NaiveDate>,

    /// Chronological; never re-sorted
    #[serde(rename = "subtitles", default)]
    pub transcript: Vec<TranscriptFragment>,

    #[serde(default)]
    pub summary: String,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Unknown video: {0}")]
    NotFound(String),

    #[error("Failed to write session document: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize session document: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Video records keyed by video id, mirrored to a YAML document.
///
/// Every [`put`](Self::put) rewrites the whole document. There is no
/// journaling: if the process dies mid-write the last complete write wins.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    records: BTreeMap<String, VideoRecord>,
}

impl SessionStore {
    /// Empty store backed by `path`; nothing is read or written
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Read the document at `path`.
    ///
    /// Best effort: a missing, unreadable or malformed document yields an
    /// empty store instead of failing startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);

        match Self::read_document(&store.path) {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} videos from {}",
                    records.len(),
                    store.path.display()
                );
                store.records = records;
            }
            Err(e) if is_missing(&e) => {
                tracing::debug!("No session document at {}, starting empty", store.path.display());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Got error while loading session document, starting empty");
            }
        }

        store
    }

    fn read_document(path: &Path) -> anyhow::Result<BTreeMap<String, VideoRecord>> {
        let content = fs_err::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<&VideoRecord, StoreError> {
        self.records
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Insert or replace a record, then persist the whole document
    pub fn put(&mut self, key: impl Into<String>, record: VideoRecord) -> Result<(), StoreError> {
        self.records.insert(key.into(), record);
        self.persist()
    }

    pub fn snapshot_all(&self) -> BTreeMap<String, VideoRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every record to the backing document
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(&self.records)?;
        fs_err::write(&self.path, content)?;

        tracing::debug!("Persisted {} videos to {}", self.records.len(), self.path.display());
        Ok(())
    }
}

fn is_missing(e: &anyhow::Error) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
