use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use super::{compute_analytics, compute_staff_metrics};
use crate::parcel::{fetch_by_date_range, FilterParams};
use crate::utils::time::start_of_day;
use crate::{AResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/staff", get(staff_handler))
}

async fn dashboard_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AResult<(StatusCode, Json<Value>)> {
    let (range, parcels) = fetch_by_date_range(&state, params.filter).await?;
    let analytics = compute_analytics(&parcels, start_of_day(Utc::now(), state.timezone));

    return Ok((
        StatusCode::OK,
        Json(json!({
            "dashboardMetrics": analytics.dashboard_metrics,
            "statusChartData": analytics.status_chart_data,
            "filter": params.filter,
            "from": range.from,
            "to": range.to,
            "seq": params.seq,
        })),
    ));
}

async fn staff_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AResult<(StatusCode, Json<Value>)> {
    let (range, parcels) = fetch_by_date_range(&state, params.filter).await?;
    let staff_metrics = compute_staff_metrics(&parcels);

    return Ok((
        StatusCode::OK,
        Json(json!({
            "staffMetrics": staff_metrics,
            "filter": params.filter,
            "from": range.from,
            "to": range.to,
            "seq": params.seq,
        })),
    ));
}
