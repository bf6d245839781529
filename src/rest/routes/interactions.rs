// rest/routes/interactions.rs — logged-communication CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{bad_request, not_found, store_error, ApiError};
use crate::query::InteractionQuery;
use crate::rest::auth::Owner;
use crate::storage::{InteractionRow, NewInteraction};
use crate::AppContext;

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Query(q): Query<InteractionQuery>,
) -> Result<Json<Vec<InteractionRow>>, ApiError> {
    let rows = ctx
        .storage
        .list_interactions(&user.id, &q)
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Json(body): Json<NewInteraction>,
) -> Result<(StatusCode, Json<InteractionRow>), ApiError> {
    if body.prospect_id.trim().is_empty() {
        return Err(bad_request("missing prospectId"));
    }
    if body.channel.trim().is_empty() {
        return Err(bad_request("missing channel"));
    }
    let row = ctx
        .storage
        .create_interaction(&user.id, &body)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn remove(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if ctx
        .storage
        .delete_interaction(&user.id, &id)
        .await
        .map_err(store_error)?
    {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(not_found())
    }
}
