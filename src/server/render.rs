//! HTML pages. Deliberately plain: one string per page, no templates.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::process::HTML_LINE_BREAK;
use crate::store::VideoRecord;
use crate::workflow::{ClipArtifact, IngestedVideo, SelectionView};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape text that already carries line-break markers, keeping the markers
fn escape_keeping_breaks(text: &str) -> String {
    text.split(HTML_LINE_BREAK)
        .map(escape_html)
        .collect::<Vec<_>>()
        .join(HTML_LINE_BREAK)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>\n{}</body></html>",
        escape_html(title),
        body
    )
}

pub fn index(videos: &BTreeMap<String, VideoRecord>) -> String {
    let mut body = String::from(
        "<h1>Videos</h1>\n\
         <form action=\"/new\" method=\"post\">\n\
         <input type=\"text\" name=\"video\" placeholder=\"Video id or URL\">\n\
         <input type=\"submit\" value=\"Download\">\n\
         </form>\n<ul>\n",
    );

    for (video_id, record) in videos {
        let published = record
            .publish_date
            .map(|d| format!(" ({d})"))
            .unwrap_or_default();
        let _ = writeln!(
            body,
            "<li><a href=\"/step2?video={}\">{}</a>{}</li>",
            urlencoding::encode(video_id),
            escape_html(&record.title),
            escape_html(&published),
        );
    }
    body.push_str("</ul>\n");

    page("Videos", &body)
}

pub fn ingested(video: &IngestedVideo) -> String {
    let published = video
        .record
        .publish_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "an unknown date".to_string());

    let body = format!(
        "Completed downloading video {}: {} on {}\n<p><a href=\"/step2?video={}\">Pick a range</a></p>\n",
        escape_html(&video.video_id),
        escape_html(&video.record.title),
        published,
        urlencoding::encode(&video.video_id),
    );
    page("Downloaded Youtube Video", &body)
}

pub fn selection(view: &SelectionView) -> String {
    let mut body = format!(
        "<h1>{}</h1>\n<div class=\"summary\">{}</div>\n\
         <form action=\"/generate\" method=\"post\">\n\
         <input type=\"hidden\" name=\"video\" value=\"{}\">\n\
         <input type=\"submit\" value=\"Generate\">\n",
        escape_html(&view.title),
        escape_keeping_breaks(&view.summary),
        escape_html(&view.video_id),
    );

    for entry in &view.entries {
        let _ = writeln!(
            body,
            "<div><input type=\"checkbox\" name=\"subtitles\" value=\"{}\"> \
             <a href=\"{}\">{} [{}]</a> {}</div>",
            escape_html(&entry.label),
            escape_html(&entry.watch_url),
            entry.timestamp,
            entry.start,
            escape_html(&entry.text),
        );
    }
    body.push_str("<input type=\"submit\" value=\"Generate\">\n</form>\n");

    page(&view.title, &body)
}

pub fn download_link(artifact: &ClipArtifact) -> String {
    let body = format!(
        "<p style=\"font-size:30px\"><a href=\"/download/{}\" download target=\"_blank\">DOWNLOAD</a></p>\n",
        urlencoding::encode(&artifact.file_name),
    );
    page("download file", &body)
}
