//! reelcut - clip highlight ranges out of YouTube videos
//!
//! Downloads a video with yt-dlp, fetches its transcript, asks a completion
//! endpoint for the moments worth clipping, and cuts a picked transcript range
//! out of the download with ffmpeg. Everything is driven from a small local
//! web UI or the command line.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod process;
pub mod selection;
pub mod server;
pub mod store;
pub mod summary;
pub mod utils;
pub mod workflow;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{SourceError, VideoMetadata, VideoSource};
pub use process::{CommandOutput, CommandRunner, ProcessRunner};
pub use selection::{resolve, ClipRange, SelectionError};
pub use store::{SessionStore, StoreError, TranscriptFragment, VideoRecord};
pub use summary::{Summarizer, SummaryError, SummaryPolicy};
pub use workflow::{Orchestrator, WorkflowError, WorkflowSettings};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
