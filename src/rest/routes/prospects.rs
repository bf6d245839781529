// rest/routes/prospects.rs — prospect CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{bad_request, not_found, store_error, ApiError};
use crate::query::ProspectQuery;
use crate::rest::auth::Owner;
use crate::storage::{NewProspect, ProspectPatch, ProspectRow};
use crate::AppContext;

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Query(q): Query<ProspectQuery>,
) -> Result<Json<Vec<ProspectRow>>, ApiError> {
    let rows = ctx
        .storage
        .list_prospects(&user.id, &q)
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Json(body): Json<NewProspect>,
) -> Result<(StatusCode, Json<ProspectRow>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(bad_request("missing name"));
    }
    let row = ctx
        .storage
        .create_prospect(&user.id, &body)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Path(id): Path<String>,
    Json(patch): Json<ProspectPatch>,
) -> Result<Json<ProspectRow>, ApiError> {
    match ctx
        .storage
        .update_prospect(&user.id, &id, &patch)
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
        .delete_prospect(&user.id, &id)
        .await
        .map_err(store_error)?
    {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(not_found())
    }
}
