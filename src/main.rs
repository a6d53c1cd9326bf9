use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelcut::process::HTML_LINE_BREAK;
use reelcut::{utils, Cli, Commands, Config, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "reelcut=debug,tower_http=debug"
    } else {
        "reelcut=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command.unwrap_or_default() {
        Commands::Serve { bind, port } => {
            warn_missing_dependencies(&config).await;

            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{bind}:{port}")
                .parse()
                .with_context(|| format!("Invalid listen address {bind}:{port}"))?;

            let orchestrator = Arc::new(Orchestrator::from_config(&config));
            reelcut::server::serve(orchestrator, addr).await?;
        }
        Commands::Ingest { video } => {
            warn_missing_dependencies(&config).await;

            let orchestrator = Orchestrator::from_config(&config);
            let progress = spinner(cli.quiet, format!("Downloading and summarizing {video}..."));

            let result = orchestrator.ingest(&video).await;
            progress.finish_and_clear();
            let ingested = result?;

            println!(
                "{} {}: {}",
                style("Ingested").green().bold(),
                ingested.video_id,
                ingested.record.title
            );
            println!("  Transcript lines: {}", ingested.record.transcript.len());
            println!("  File: {}", ingested.record.file_path.display());
            println!();
            println!("{}", ingested.record.summary.replace(HTML_LINE_BREAK, "\n"));
        }
        Commands::Clip { video, from, to } => {
            let orchestrator = Orchestrator::from_config(&config);
            let progress = spinner(cli.quiet, format!("Clipping {video}..."));

            let result = orchestrator.extract(&video, &[from, to]).await;
            progress.finish_and_clear();
            let artifact = result?;

            println!(
                "{} {}s-{}s to {}",
                style("Clipped").green().bold(),
                artifact.range.start_second,
                artifact.range.end_second,
                artifact.path.display()
            );
        }
        Commands::List => {
            let orchestrator = Orchestrator::from_config(&config);
            let videos = orchestrator.videos().await;

            if videos.is_empty() {
                println!("No videos ingested yet.");
            }
            for (video_id, record) in videos {
                let published = record
                    .publish_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {} ({} lines)",
                    style(video_id).cyan(),
                    published,
                    record.title,
                    record.transcript.len()
                );
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file:");
                println!("  {}", Config::config_path()?.display());
                println!("Edit it and restart, or run `reelcut config --show` to inspect it.");
            }
        }
    }

    Ok(())
}

async fn warn_missing_dependencies(config: &Config) {
    // Non-fatal: the programs may be resolved differently at run time
    let missing = utils::check_dependencies(&config.downloader.program, &config.clipper.program).await;
    if !missing.is_empty() {
        eprintln!("{}", style("Dependency check warnings:").yellow());
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }
}

fn spinner(quiet: bool, message: String) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(template);
    }
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
