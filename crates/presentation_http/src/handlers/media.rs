//! Synthesized answer audio

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// `GET /static/tts/{file}`
///
/// Unknown files and names that could leave the artifact directory are both
/// answered with a plain 404.
pub async fn serve_audio(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    match state.artifacts.load(&file).await? {
        Some(data) => Ok(([(header::CONTENT_TYPE, "audio/mpeg")], data).into_response()),
        None => {
            debug!(file, "Audio artifact not found");
            Ok((StatusCode::NOT_FOUND, "Not found").into_response())
        },
    }
}
