use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::entity::NoteView;
use crate::error::BoardError;

/// Body of `POST /add_thought`. Both fields are optional at the type level so
/// that a missing one produces the validation message, not a parse error.
#[derive(Debug, Default, Deserialize)]
pub struct AddThought {
    pub board_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn add_thought(
    State(state): State<AppState>,
    body: Result<Json<AddThought>, JsonRejection>,
) -> Result<Json<NoteView>, BoardError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected add_thought body");
        BoardError::missing_fields()
    })?;

    let board_id = body.board_id.unwrap_or_default();
    let content = body.content.unwrap_or_default();

    let view = state.sync.submit_note(&board_id, &content).await?;
    Ok(Json(view))
}

pub async fn get_thoughts(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<Vec<NoteView>>, BoardError> {
    Ok(Json(state.sync.snapshot(&board_id).await?))
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = match &self {
            BoardError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
