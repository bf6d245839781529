pub mod followups;
pub mod health;
pub mod interactions;
pub mod moves;
pub mod prospects;
pub mod routed_contacts;
pub mod stats;
pub mod users;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::storage::StoreError;

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn bad_request(msg: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
}

pub(crate) fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}

/// Map a store failure onto the REST taxonomy: a missing prospect reference
/// is a 404 (same body whether it never existed or belongs to someone else);
/// everything else is a logged 500 with a generic body.
pub(crate) fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::MissingProspect => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "prospect not found" })),
        ),
        other => {
            tracing::error!(err = %other, "store operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
        }
    }
}
