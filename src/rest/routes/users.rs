// rest/routes/users.rs — self-service registration.
//
// Returns the minted API token once, at creation. There is no endpoint to
// read it back; losing it means registering again.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{bad_request, store_error, ApiError};
use crate::storage::StoreError;
use crate::AppContext;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
}

pub async fn register(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = body.email.trim();
    let name = body.name.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(bad_request("invalid email"));
    }
    if name.is_empty() {
        return Err(bad_request("missing name"));
    }

    match ctx.storage.create_user(email, name, "USER").await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "id": user.id,
                "email": user.email,
                "name": user.name,
                "apiToken": user.api_token,
            })),
        )),
        Err(StoreError::DuplicateEmail) => Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "email already registered" })),
        )),
        Err(e) => Err(store_error(e)),
    }
}
