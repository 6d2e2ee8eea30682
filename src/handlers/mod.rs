use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod auth;
pub mod catalog;
pub mod entries;
pub mod gate;
pub mod passes;
pub mod payments;

#[derive(Serialize)]
pub struct HealthPayload {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn health_check() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "OK",
        timestamp: Utc::now(),
    })
}
