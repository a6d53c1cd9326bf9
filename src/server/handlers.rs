use axum::extract::{Form, Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::error::{AppError, AppResult};
use super::render;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct VideoForm {
    pub video: String,
}

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    pub video: String,
}

/// Fields of the picker form. `subtitles` repeats once per checked line.
#[derive(Debug, Default, PartialEq)]
pub struct GenerateForm {
    pub video: Option<String>,
    pub subtitles: Vec<String>,
}

impl GenerateForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "video" => form.video = Some(value),
                "subtitles" => form.subtitles.push(value),
                _ => {}
            }
        }
        form
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let videos = state.orchestrator.videos().await;
    Html(render::index(&videos))
}

pub async fn new_video(
    State(state): State<AppState>,
    Form(form): Form<VideoForm>,
) -> AppResult<Html<String>> {
    tracing::info!(video = %form.video, "Ingest requested");
    let ingested = state.orchestrator.ingest(&form.video).await?;
    Ok(Html(render::ingested(&ingested)))
}

pub async fn step2(
    State(state): State<AppState>,
    Query(query): Query<VideoQuery>,
) -> AppResult<Html<String>> {
    tracing::info!(video = %query.video, "Selection requested");
    let view = state.orchestrator.select(&query.video).await?;
    Ok(Html(render::selection(&view)))
}

pub async fn generate(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Html<String>> {
    let form = GenerateForm::from_pairs(pairs);
    let video = form.video.ok_or(AppError::MissingField("video"))?;

    tracing::info!(video = %video, subtitles = ?form.subtitles, "Clip requested");
    let artifact = state.orchestrator.extract(&video, &form.subtitles).await?;
    Ok(Html(render::download_link(&artifact)))
}
