use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::services::gate::{self, DenialReason, Grant, Verdict};
use crate::state::AppState;
use crate::store::PassStore;
use crate::utils::error::{AppError, Result};
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQrRequest {
    pub qr_data: String,
    #[serde(default)]
    pub staff_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GrantPayload {
    pub user: Grant,
}

/// Staff scanner endpoint. No bearer token: the scanner runs at the gate.
pub async fn verify_qr<S: PassStore>(
    State(state): State<AppState<S>>,
    request: std::result::Result<Json<VerifyQrRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = request.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Verify request body rejected");
        AppError::from(DenialReason::MalformedPayload)
    })?;

    let verdict = gate::verify(
        &state.store,
        &request.qr_data,
        request.staff_id.as_deref(),
        Utc::now(),
    )
    .await?;

    match verdict {
        Verdict::Granted(grant) => Ok(success(GrantPayload { user: grant }, "Access granted")),
        Verdict::Denied(reason) => Err(reason.into()),
    }
}
