//! Direct question API and query history

use application::AnsweredQuestion;
use axum::{
    Json,
    extract::{Query, State},
};
use domain::QueryRecord;
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// Body of `POST /query`
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

/// `POST /query` - answer in the working language, no translation
#[instrument(skip_all, fields(question_len = request.question.len()))]
pub async fn ask_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<AnsweredQuestion>, ApiError> {
    let answered = state.questions.ask(&request.question).await?;
    Ok(Json(answered))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

/// `GET /queries` - newest first
#[instrument(skip_all, fields(limit = params.limit))]
pub async fn list_queries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<QueryRecord>>, ApiError> {
    Ok(Json(state.questions.list(params.limit).await?))
}
