use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::extractors::SourceError;
use crate::workflow::WorkflowError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::Workflow(e) => workflow_status(e),
        }
    }
}

/// Command failures and rejected selections are reported as 503, matching
/// what the picker page has always received for them.
pub fn workflow_status(e: &WorkflowError) -> StatusCode {
    match e {
        WorkflowError::ExternalProcess { .. } | WorkflowError::Selection(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
        WorkflowError::Source(SourceError::InvalidReference(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::warn!(error = %self, status = %status, "Request rejected");
        }

        // command output already carries <br> markers and is shown verbatim
        (status, Html(self.to_string())).into_response()
    }
}
