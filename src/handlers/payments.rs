use axum::extract::State;
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::issuance::{issue_mock_pass, IssuedPass};
use crate::state::AppState;
use crate::store::PassStore;
use crate::utils::auth::AuthUser;
use crate::utils::error::Result;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockPaymentRequest {
    #[serde(default)]
    pub payment_id: Option<String>,
    pub pass_type_id: Uuid,
    /// Informational; the charge is always the catalog price.
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct MockPaymentPayload {
    pub pass: IssuedPass,
}

pub async fn mock_process<S: PassStore>(
    State(state): State<AppState<S>>,
    caller: AuthUser,
    Json(request): Json<MockPaymentRequest>,
) -> Result<Response> {
    let issued = issue_mock_pass(
        &state.store,
        caller.user_id(),
        request.pass_type_id,
        request.payment_id,
        Utc::now(),
    )
    .await?;

    if let Some(amount) = request.amount {
        tracing::debug!(client_amount = %amount, pass_id = %issued.id, "Ignoring client amount");
    }

    Ok(success(
        MockPaymentPayload { pass: issued },
        "Mock payment successful and pass created",
    ))
}
