// rest/routes/moves.rs — the record-movement endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::ApiError;
use crate::movement::{MoveError, StoreKind};
use crate::rest::auth::Owner;
use crate::storage::StoreError;
use crate::AppContext;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub source_kind: StoreKind,
    pub source_id: String,
    pub destination_kind: StoreKind,
    pub sub_type: Option<String>,
    pub note: Option<String>,
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Json(body): Json<MoveRequest>,
) -> Result<Json<Value>, ApiError> {
    let report = ctx
        .mover
        .move_record(
            &user.id,
            body.source_kind,
            &body.source_id,
            body.destination_kind,
            body.sub_type.as_deref(),
            body.note.as_deref(),
        )
        .await
        .map_err(move_error)?;

    Ok(Json(json!({
        "status": if report.partial { "partial" } else { "moved" },
        "destinationKind": report.destination_kind,
        "destinationId": report.destination_id,
        "detail": report.detail,
    })))
}

fn move_error(e: MoveError) -> ApiError {
    match e {
        MoveError::InvalidDestination | MoveError::MissingType | MoveError::InvalidType(_) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })))
        }
        MoveError::SourceNotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not found" })),
        ),
        MoveError::CreateFailed(StoreError::MissingProspect) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "prospect not found" })),
        ),
        MoveError::CreateFailed(other) | MoveError::SourceLoadFailed(other) => {
            tracing::error!(err = %other, "move failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
        }
    }
}
