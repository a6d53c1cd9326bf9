mod mocks;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use mocks::{
    process_runner::MockProcessRunner, summarizer::MockSummarizer, video_source::MockVideoSource,
};
use reelcut::{Orchestrator, SessionStore, TranscriptFragment, WorkflowSettings};

struct Harness {
    _dir: TempDir,
    store_path: std::path::PathBuf,
    output_dir: std::path::PathBuf,
    app: Router,
    runner: MockProcessRunner,
    summarizer: MockSummarizer,
    source: MockVideoSource,
}

fn harness(
    runner: MockProcessRunner,
    source: MockVideoSource,
    summarizer: MockSummarizer,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("config.yaml");
    let settings = WorkflowSettings {
        videos_dir: dir.path().join("videos"),
        output_dir: dir.path().join("data"),
        ..WorkflowSettings::default()
    };
    let output_dir = settings.output_dir.clone();

    let orchestrator = Orchestrator::new(
        settings,
        SessionStore::load(&store_path),
        Arc::new(runner.clone()),
        Arc::new(source.clone()),
        Arc::new(summarizer.clone()),
    );

    Harness {
        _dir: dir,
        store_path,
        output_dir,
        app: reelcut::server::router(Arc::new(orchestrator)),
        runner,
        summarizer,
        source,
    }
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

fn short_transcript() -> Vec<TranscriptFragment> {
    vec![
        TranscriptFragment::new(5.0, 3.0, "A"),
        TranscriptFragment::new(9.0, 4.0, "B"),
        TranscriptFragment::new(20.0, 5.0, "C"),
    ]
}

#[tokio::test]
async fn test_ingest_select_extract_download() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new("[5] A<br>\n"),
    );

    let (status, body) = send(&h.app, form("/new", "video=abc123")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains("Completed downloading video abc123: A talk on 2024-03-09"));

    let (status, body) = send(&h.app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"href="/step2?video=abc123""#));

    let (status, body) = send(&h.app, get("/step2?video=abc123")).await;
    assert_eq!(status, StatusCode::OK);
    for label in ["5_8", "9_13", "20_25"] {
        assert!(body.contains(&format!(r#"value="{label}""#)), "missing {label}");
    }
    assert!(body.contains("[5] A<br>\n"));

    let (status, body) = send(
        &h.app,
        form("/generate", "video=abc123&subtitles=5_8&subtitles=20_25"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains(r#"href="/download/abc123_5_25.mp4""#));

    let calls = h.runner.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][0], "yt-dlp");
    let clip = &calls[1];
    assert_eq!(clip[0], "ffmpeg");
    assert_eq!(&clip[4..8], ["-ss", "5s", "-t", "20.5s"]);
    assert!(h.output_dir.join("abc123_5_25.mp4").exists());

    let (status, body) = send(&h.app, get("/download/abc123_5_25.mp4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "fake media");
}

#[tokio::test]
async fn test_ingest_persists_record() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new("summary"),
    );

    let (status, _) = send(&h.app, form("/new", "video=abc123")).await;
    assert_eq!(status, StatusCode::OK);

    let reloaded = SessionStore::load(&h.store_path);
    let record = reloaded.get("abc123").unwrap();
    assert_eq!(record.title, "A talk");
    assert_eq!(record.transcript, short_transcript());
    assert_eq!(record.summary, "summary");
}

#[tokio::test]
async fn test_ingest_accepts_urls() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new(""),
    );

    let (status, body) = send(
        &h.app,
        form("/new", "video=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        h.source.calls.lock().unwrap().as_slice(),
        ["metadata:dQw4w9WgXcQ", "transcript:dQw4w9WgXcQ"]
    );
}

#[tokio::test]
async fn test_long_video_summary_skips_preamble() {
    let mut transcript = vec![TranscriptFragment::new(0.0, 30.0, "hi")];
    transcript.push(TranscriptFragment::new(6000.0, 10.0, "bye"));

    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("Long", transcript),
        MockSummarizer::new(""),
    );

    let (status, _) = send(&h.app, form("/new", "video=abc123")).await;
    assert_eq!(status, StatusCode::OK);

    // fewer than 1000 lines: the window is empty but the call still happens
    let calls = h.summarizer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_empty());
}

#[tokio::test]
async fn test_download_failure_returns_503_with_output() {
    let h = harness(
        MockProcessRunner::failing(1, "[youtube] abc123<br>\n", "ERROR: Video unavailable<br>\n"),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new(""),
    );

    let (status, body) = send(&h.app, form("/new", "video=abc123")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.starts_with("Command [\"yt-dlp\""));
    assert!(body.contains("[youtube] abc123<br>\n"));
    assert!(body.contains("ERROR: Video unavailable<br>\n"));

    assert!(h.source.calls.lock().unwrap().is_empty());
    assert!(!h.store_path.exists());
}

#[tokio::test]
async fn test_summary_failure_is_a_server_error() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::failing(),
    );

    let (status, _) = send(&h.app, form("/new", "video=abc123")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (_, body) = send(&h.app, get("/")).await;
    assert!(!body.contains("abc123"));
}

#[tokio::test]
async fn test_unknown_video_is_404() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", vec![]),
        MockSummarizer::new(""),
    );

    let (status, _) = send(&h.app, get("/step2?video=missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &h.app,
        form("/generate", "video=missing&subtitles=5_8&subtitles=20_25"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_selection_returns_503() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new(""),
    );
    send(&h.app, form("/new", "video=abc123")).await;

    let (status, body) = send(&h.app, form("/generate", "video=abc123&subtitles=5_8")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("got 1"), "{body}");

    let (status, body) = send(
        &h.app,
        form("/generate", "video=abc123&subtitles=5_8&subtitles=oops"),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("second"), "{body}");

    // only the download ran
    assert_eq!(h.runner.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clip_failure_returns_503_with_output() {
    let h = harness(
        MockProcessRunner::failing_from(
            1,
            234,
            "ffmpeg version 6.1<br>\n",
            "Invalid duration specification for t: -17.5s<br>\n",
        ),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new(""),
    );

    let (status, _) = send(&h.app, form("/new", "video=abc123")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &h.app,
        form("/generate", "video=abc123&subtitles=20_25&subtitles=5_8"),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.starts_with("Command [\"ffmpeg\""), "{body}");
    assert!(body.ends_with(
        " failed:\nffmpeg version 6.1<br>\n\nInvalid duration specification for t: -17.5s<br>\n"
    ));
    assert!(!h.output_dir.join("abc123_20_8.mp4").exists());
}

#[tokio::test]
async fn test_extreme_selection_returns_503() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new(""),
    );
    send(&h.app, form("/new", "video=abc123")).await;

    let (status, _) = send(
        &h.app,
        form(
            "/generate",
            "video=abc123&subtitles=-9223372036854775808_0&subtitles=0_9223372036854775807",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(h.runner.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ingest_rejects_option_like_ids() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", short_transcript()),
        MockSummarizer::new(""),
    );

    for body in ["video=--exec%3Dtouch+%2Ftmp%2Fx", "video=..%2Fvictim"] {
        let (status, _) = send(&h.app, form("/new", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert!(h.runner.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_video_field_is_400() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", vec![]),
        MockSummarizer::new(""),
    );

    let (status, _) = send(&h.app, form("/generate", "subtitles=5_8&subtitles=20_25")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_of_unknown_clip_is_404() {
    let h = harness(
        MockProcessRunner::default(),
        MockVideoSource::new("A talk", vec![]),
        MockSummarizer::new(""),
    );

    let (status, _) = send(&h.app, get("/download/nope.mp4")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
