// rest/routes/stats.rs — dashboard counters.

use axum::{extract::State, Json};
use chrono::{Datelike, Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{store_error, ApiError};
use crate::rest::auth::Owner;
use crate::AppContext;

/// Totals for the dashboard: all prospects, followups still pending today,
/// interactions logged in the last 7 days, and prospects won this month.
pub async fn dashboard(
    State(ctx): State<Arc<AppContext>>,
    Owner(user): Owner,
) -> Result<Json<Value>, ApiError> {
    let now = Utc::now();
    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .to_rfc3339();
    let day_end = (now.date_naive() + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .to_rfc3339();
    let week_ago = (now - Duration::days(7)).to_rfc3339();
    let month_start = now
        .date_naive()
        .with_day(1)
        .unwrap_or(now.date_naive())
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .to_rfc3339();

    let prospects = ctx
        .storage
        .count_prospects(&user.id)
        .await
        .map_err(store_error)?;
    let followups_today = ctx
        .storage
        .count_pending_followups_between(&user.id, &day_start, &day_end)
        .await
        .map_err(store_error)?;
    let interactions_week = ctx
        .storage
        .count_interactions_since(&user.id, &week_ago)
        .await
        .map_err(store_error)?;
    let conversions_month = ctx
        .storage
        .count_won_prospects_since(&user.id, &month_start)
        .await
        .map_err(store_error)?;

    Ok(Json(json!({
        "prospects": prospects,
        "followupsToday": followups_today,
        "interactionsThisWeek": interactions_week,
        "conversionsThisMonth": conversions_month,
    })))
}
