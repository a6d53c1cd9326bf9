use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

pub mod youtube;

use crate::store::TranscriptFragment;

pub use youtube::YtDlpSource;

/// Descriptive metadata reported for a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub publish_date: Option<NaiveDate>,
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Not a recognizable video reference: {0}")]
    InvalidReference(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed: {stderr}")]
    Command { program: String, stderr: String },

    #[error("Unexpected {what} output: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("No transcript available for video {0}")]
    NoTranscript(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where video metadata and transcripts come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata, SourceError>;

    /// Fragments in chronological order
    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptFragment>, SourceError>;
}

pub const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Watch page link, optionally starting at `start_second`
pub fn watch_url(video_id: &str, start_second: Option<i64>) -> String {
    let id = urlencoding::encode(video_id);
    match start_second {
        Some(start) => format!("{WATCH_URL}?v={id}&t={start}s"),
        None => format!("{WATCH_URL}?v={id}"),
    }
}

/// Canonical video id for a user-supplied reference.
///
/// `http(s)` references are parsed as YouTube URLs; anything else is taken to
/// already be an id.
pub fn normalize_video_id(reference: &str) -> Result<String, SourceError> {
    let reference = reference.trim();
    let invalid = || SourceError::InvalidReference(reference.to_string());

    if reference.is_empty() {
        return Err(invalid());
    }

    if !(reference.starts_with("https://") || reference.starts_with("http://")) {
        return Some(reference.to_string())
            .filter(|id| is_safe_id(id))
            .ok_or_else(invalid);
    }

    let url = Url::parse(reference).map_err(|_| invalid())?;
    let host = url.host_str().unwrap_or_default();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let mut segments = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter();

    let id = match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "music.youtube.com" => {
            let from_query = url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned());

            from_query.or_else(|| match segments.next() {
                Some("embed" | "shorts" | "live" | "v") => segments.next().map(str::to_string),
                _ => None,
            })
        }
        _ => None,
    };

    id.filter(|id| is_safe_id(id)).ok_or_else(invalid)
}

/// Ids end up as a command-line argument and a file name, so they may not
/// look like an option or step outside the directory they are joined to.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('-')
        && !id.contains(['/', '\\'])
        && !id.contains("..")
}
