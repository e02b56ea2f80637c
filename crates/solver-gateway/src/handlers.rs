use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use solver_core::{FileContentMap, Upload};

use super::server::AppState;

#[derive(serde::Serialize)]
struct AnswerResponse {
    answer: String,
}

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Question text and uploaded files from a multipart form.
#[derive(Default)]
struct AnswerForm {
    question: Option<String>,
    uploads: Vec<Upload>,
}

impl AnswerForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("question") => form.question = Some(field.text().await?),
                Some("file") => form.push_file(field).await?,
                _ => {}
            }
        }
        Ok(form)
    }

    async fn push_file(&mut self, field: Field<'_>) -> Result<(), MultipartError> {
        let Some(filename) = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned)
        else {
            return Ok(());
        };
        let data = field.bytes().await?;
        self.uploads.push(Upload::new(filename, data.to_vec()));
        Ok(())
    }
}

pub(crate) async fn answer_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let form = match AnswerForm::read(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!("failed to read multipart form: {e}");
            return error_response(e.status(), format!("Error processing request: {e}"));
        }
    };

    let Some(question) = form.question.filter(|q| !q.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No question provided");
    };
    tracing::info!(files = form.uploads.len(), "answering question");

    let files = if form.uploads.is_empty() {
        FileContentMap::new()
    } else {
        let ingestor = state.ingestor;
        let uploads = form.uploads;
        match tokio::task::spawn_blocking(move || ingestor.ingest_uploads(&uploads)).await {
            Ok(Ok(files)) => files,
            Ok(Err(e)) => {
                tracing::error!("failed to ingest uploads: {e}");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing request: {e}"),
                );
            }
            Err(e) => {
                tracing::error!("ingest task failed: {e}");
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error processing request: {e}"),
                );
            }
        }
    };

    let answer = state.orchestrator.answer(&question, &files).await;
    Json(AnswerResponse { answer }).into_response()
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
