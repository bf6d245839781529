// rest/routes/followups.rs — scheduled follow-up CRUD.
//
// Creation always starts at PENDING; the payload type has no status field,
// so client-supplied statuses are ignored rather than validated.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{bad_request, not_found, store_error, ApiError};
use crate::query::FollowupQuery;
use crate::rest::auth::Owner;
use crate::storage::{FollowupPatch, FollowupRow, NewFollowup};
use crate::AppContext;

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Query(q): Query<FollowupQuery>,
) -> Result<Json<Vec<FollowupRow>>, ApiError> {
    let rows = ctx
        .storage
        .list_followups(&user.id, &q)
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Json(body): Json<NewFollowup>,
) -> Result<(StatusCode, Json<FollowupRow>), ApiError> {
    if body.prospect_id.trim().is_empty() {
        return Err(bad_request("missing prospectId"));
    }
    if body.title.trim().is_empty() {
        return Err(bad_request("missing title"));
    }
    if body.scheduled_at.trim().is_empty() {
        return Err(bad_request("missing scheduledAt"));
    }
    let row = ctx
        .storage
        .create_followup(&user.id, &body)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Path(id): Path<String>,
    Json(patch): Json<FollowupPatch>,
) -> Result<Json<FollowupRow>, ApiError> {
    match ctx
        .storage
        .update_followup(&user.id, &id, &patch)
        .await
        .map_err(store_error)?
    {
        Some(row) => Ok(Json(row)),
        None => Err(not_found()),
    }
}

pub async fn remove(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if ctx
        .storage
        .delete_followup(&user.id, &id)
        .await
        .map_err(store_error)?
    {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(not_found())
    }
}
