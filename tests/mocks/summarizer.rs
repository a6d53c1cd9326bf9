use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use reelcut::{Summarizer, SummaryError, TranscriptFragment};

#[derive(Clone)]
pub struct MockSummarizer {
    pub summary: String,
    pub calls: Arc<Mutex<Vec<Vec<TranscriptFragment>>>>,
    pub fail: bool,
}

impl MockSummarizer {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, window: &[TranscriptFragment]) -> Result<String, SummaryError> {
        self.calls.lock().unwrap().push(window.to_vec());
        if self.fail {
            return Err(SummaryError::Api {
                status: 500,
                message: "upstream exploded".into(),
            });
        }
        Ok(self.summary.clone())
    }
}
