// rest/auth.rs — bearer-token owner authentication.
//
// Every entity endpoint extracts an `Owner`; a missing or unknown token is
// rejected with 401 before the handler body runs. The 401 body never reveals
// whether any record exists.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::storage::UserRow;
use crate::AppContext;

/// The authenticated user whose records a request operates on.
pub struct Owner(pub UserRow);

impl FromRequestParts<Arc<AppContext>> for Owner {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let Some(token) = header.strip_prefix("Bearer ") else {
            return Err(unauthorized());
        };

        match ctx.storage.find_user_by_token(token).await {
            Ok(Some(user)) => Ok(Owner(user)),
            Ok(None) => Err(unauthorized()),
            Err(e) => {
                error!(err = %e, "token lookup failed");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                ))
            }
        }
    }
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized" })),
    )
}
