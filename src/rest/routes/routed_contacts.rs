// rest/routes/routed_contacts.rs — sector triage board CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::{bad_request, not_found, store_error, ApiError};
use crate::movement::is_valid_bucket;
use crate::query::RoutedContactQuery;
use crate::rest::auth::Owner;
use crate::storage::{NewRoutedContact, RoutedContactPatch, RoutedContactRow};
use crate::AppContext;

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Query(q): Query<RoutedContactQuery>,
) -> Result<Json<Vec<RoutedContactRow>>, ApiError> {
    let rows = ctx
        .storage
        .list_routed_contacts(&user.id, &q)
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Json(body): Json<NewRoutedContact>,
) -> Result<(StatusCode, Json<RoutedContactRow>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(bad_request("missing name"));
    }
    if !is_valid_bucket(&body.bucket) {
        return Err(bad_request("invalid bucket"));
    }
    let row = ctx
        .storage
        .create_routed_contact(&user.id, &body)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
    Path(id): Path<String>,
    Json(patch): Json<RoutedContactPatch>,
) -> Result<Json<RoutedContactRow>, ApiError> {
    if let Some(bucket) = &patch.bucket {
        if !is_valid_bucket(bucket) {
            return Err(bad_request("invalid bucket"));
        }
    }
    match ctx
        .storage
        .update_routed_contact(&user.id, &id, &patch)
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
        .delete_routed_contact(&user.id, &id)
        .await
        .map_err(store_error)?
    {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(not_found())
    }
}
