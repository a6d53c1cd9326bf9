pub mod process_runner;
pub mod summarizer;
pub mod video_source;
