use std::path::Path;

use crate::selection::ClipRange;

/// `yt-dlp -f <format> -o <target> -- <id>`
pub fn download_command(program: &str, format: &str, target: &Path, video_id: &str) -> Vec<String> {
    vec![
        program.to_string(),
        "-f".to_string(),
        format.to_string(),
        "-o".to_string(),
        target.to_string_lossy().into_owned(),
        "--".to_string(),
        video_id.to_string(),
    ]
}

/// Stream-copy `range` (plus padding) out of `source` into `target`
pub fn clip_command(program: &str, source: &Path, range: ClipRange, target: &Path) -> Vec<String> {
    vec![
        program.to_string(),
        "-y".to_string(),
        "-i".to_string(),
        source.to_string_lossy().into_owned(),
        "-ss".to_string(),
        format!("{}s", range.start_second),
        "-t".to_string(),
        format!("{}s", range.padded_duration()),
        "-codec".to_string(),
        "copy".to_string(),
        target.to_string_lossy().into_owned(),
    ]
}
