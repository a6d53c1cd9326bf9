use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use reelcut::{SourceError, TranscriptFragment, VideoMetadata, VideoSource};

#[derive(Clone)]
pub struct MockVideoSource {
    pub title: String,
    pub transcript: Vec<TranscriptFragment>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockVideoSource {
    pub fn new(title: &str, transcript: Vec<TranscriptFragment>) -> Self {
        Self {
            title: title.to_string(),
            transcript,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl VideoSource for MockVideoSource {
    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata, SourceError> {
        self.calls.lock().unwrap().push(format!("metadata:{video_id}"));
        Ok(VideoMetadata {
            title: self.title.clone(),
            publish_date: NaiveDate::from_ymd_opt(2024, 3, 9),
        })
    }

    async fn transcript(&self, video_id: &str) -> Result<Vec<TranscriptFragment>, SourceError> {
        self.calls.lock().unwrap().push(format!("transcript:{video_id}"));
        Ok(self.transcript.clone())
    }
}
