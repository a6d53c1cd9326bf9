use std::path::Path;

/// Clock-style timestamp, `H:MM:SS`, for a number of whole seconds.
///
/// Hours are not wrapped at 24; negative input is clamped to zero.
pub fn format_timestamp(seconds: i64) -> String {
    let total_seconds = seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    format!("{}:{:02}:{:02}", hours, minutes, secs)
}

/// Remove a file if it is there; a missing file is not an error
pub fn remove_file_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs_err::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check that the external programs the workflow shells out to are on PATH
pub async fn check_dependencies(downloader: &str, clipper: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(downloader, "--version").await {
        missing.push(format!("{downloader} - required to download videos and transcripts"));
    }

    if !check_command_available(clipper, "-version").await {
        missing.push(format!("{clipper} - required to cut clips"));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str, version_flag: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg(version_flag)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
