use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::process::html_line_breaks;
use crate::store::TranscriptFragment;

/// Which part of a transcript gets summarized.
///
/// Long recordings open with a preamble that is not worth highlighting, so
/// once the last line starts at or past `short_video_threshold_secs` the first
/// `preamble_fragments` lines are skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryPolicy {
    pub short_video_threshold_secs: f64,
    pub preamble_fragments: usize,
}

impl Default for SummaryPolicy {
    fn default() -> Self {
        Self {
            short_video_threshold_secs: 5100.0,
            preamble_fragments: 1000,
        }
    }
}

impl SummaryPolicy {
    /// Index of the first summarized line
    pub fn start_index(&self, transcript: &[TranscriptFragment]) -> usize {
        match transcript.last() {
            Some(last) if last.start >= self.short_video_threshold_secs => self.preamble_fragments,
            _ => 0,
        }
    }

    /// Lines to summarize; empty when the preamble covers the whole transcript
    pub fn window<'a>(&self, transcript: &'a [TranscriptFragment]) -> &'a [TranscriptFragment] {
        transcript
            .get(self.start_index(transcript)..)
            .unwrap_or_default()
    }
}

/// One `"{second} {text}"` line per fragment
pub fn build_prompt(window: &[TranscriptFragment]) -> String {
    window
        .iter()
        .map(|fragment| format!("{} {}", fragment.start_second(), fragment.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("No content in completion response")]
    EmptyResponse,
    #[error("No API key configured for the completion endpoint")]
    MissingApiKey,
}

/// Produces highlight summaries from a transcript window
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summary text with line breaks already substituted for display
    async fn summarize(&self, window: &[TranscriptFragment]) -> Result<String, SummaryError>;
}

/// Chat-completion client for OpenAI-compatible endpoints
pub struct OpenAiSummarizer {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiSummarizer {
    const SYSTEM_PROMPT: &'static str = include_str!("./prompts/highlights.txt");

    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn send_completion_request(
        &self,
        user_content: impl Into<String>,
    ) -> Result<CompletionResponse, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or(SummaryError::MissingApiKey)?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": Self::SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": user_content.into()
                }
            ]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(SummaryError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, window: &[TranscriptFragment]) -> Result<String, SummaryError> {
        let prompt = build_prompt(window);

        tracing::info!(lines = window.len(), model = %self.model, "Requesting summary");

        let response = self
            .send_completion_request(prompt)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize transcript"))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SummaryError::EmptyResponse)?;

        Ok(html_line_breaks(&content))
    }
}
