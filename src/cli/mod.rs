use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "reelcut",
    about = "reelcut - Download YouTube videos, summarize their transcripts and clip highlights",
    version,
    long_about = "A small local web tool that downloads a YouTube video with yt-dlp, fetches its transcript, asks a language model for highlight-worthy moments, and cuts a picked transcript range out of the video with ffmpeg."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web UI (default)
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long, env = "REELCUT_BIND", value_name = "ADDR")]
        bind: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long, env = "REELCUT_PORT", value_name = "PORT")]
        port: Option<u16>,
    },

    /// Download, transcribe and summarize a video
    Ingest {
        /// YouTube video id or URL
        #[arg(value_name = "VIDEO")]
        video: String,
    },

    /// Cut a clip between two transcript lines of an ingested video
    Clip {
        /// Video id of an ingested video
        #[arg(value_name = "VIDEO")]
        video: String,

        /// Line the clip starts at, as `start_end` seconds
        #[arg(value_name = "FROM")]
        from: String,

        /// Line the clip ends at, as `start_end` seconds
        #[arg(value_name = "TO")]
        to: String,
    },

    /// List ingested videos
    List,

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            bind: None,
            port: None,
        }
    }
}
