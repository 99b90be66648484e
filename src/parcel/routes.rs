use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use lambda_http::tracing;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{export_to_csv, seed_database, Parcel};
use crate::utils::time::{calculate_date_range, DateRange, TimeFilter};
use crate::{AResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(find_by_filter_handler))
        .route("/export", get(export_handler))
        .route("/seed", post(seed_handler))
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub filter: TimeFilter,
    /// Client request counter, echoed back so stale responses can be dropped.
    pub seq: Option<u64>,
}

pub async fn fetch_by_date_range(
    state: &AppState,
    filter: TimeFilter,
) -> AResult<(DateRange, Vec<Parcel>)> {
    let range = calculate_date_range(filter, Utc::now(), state.timezone);
    let parcels = Parcel::ddb_query_by_date_range(state, &range).await?;
    tracing::info!(
        ?filter,
        from = range.from,
        to = range.to,
        count = parcels.len(),
        "fetched parcels"
    );
    Ok((range, parcels))
}

async fn find_by_filter_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AResult<(StatusCode, Json<Value>)> {
    let (range, parcels) = fetch_by_date_range(&state, params.filter).await?;
    return Ok((
        StatusCode::OK,
        Json(json!({
            "parcels": parcels,
            "filter": params.filter,
            "from": range.from,
            "to": range.to,
            "seq": params.seq,
        })),
    ));
}

async fn export_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> AResult<impl IntoResponse> {
    let (_, parcels) = fetch_by_date_range(&state, params.filter).await?;
    let body = export_to_csv(&parcels, state.timezone)?;

    let file_name = format!(
        "parcels-{}-{}.csv",
        params.filter.as_str(),
        Utc::now().with_timezone(&state.timezone).format("%Y-%m-%d")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    ))
}

async fn seed_handler(State(state): State<AppState>) -> AResult<(StatusCode, Json<Value>)> {
    let count = seed_database(&state).await?;
    return Ok((StatusCode::CREATED, Json(json!({ "seeded": count }))));
}
