use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use axum::http::StatusCode;
use axum::{routing::get, Router};
use chrono_tz::Tz;
use lambda_http::{run, tracing, Error};
use std::env::set_var;

pub mod analytics;
pub mod config;
pub mod error;
pub mod parcel;
pub mod utils;

pub use error::{AError, AResult};

#[derive(Clone)]
pub struct AppState {
    pub dynamodb_client: Client,
    pub table_name: String,
    pub timezone: Tz,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Error> {
    // If you use API Gateway stages, the Rust Runtime will include the stage name
    // as part of the path that your application receives.
    // Setting the following environment variable, you can remove the stage from the path.
    // i.e with: `GET /test-stage/api/v1/parcel` without: `GET /api/v1/parcel`
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let config = config::Config::from_env().map_err(|e| e.0)?;
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

    tracing::info!(
        table = %config.table_name,
        timezone = %config.timezone,
        "starting parcel analytics"
    );

    let state = AppState {
        dynamodb_client: Client::new(&aws_config),
        table_name: config.table_name,
        timezone: config.timezone,
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/parcel", parcel::router())
        .nest("/api/v1/analytics", analytics::router())
        .with_state(state);

    run(app).await
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}
