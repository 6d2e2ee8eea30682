//! Turning a confirmed payment into a pass.

use chrono::{DateTime, Days, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{NewPass, NewPayment, PaymentStatus, QrPayload, MOCK_PAYMENT_METHOD};
use crate::store::PassStore;
use crate::utils::error::{AppError, Result};
use crate::utils::qr;

/// A freshly issued pass with its scannable rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedPass {
    pub id: Uuid,
    pub pass_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub qr_code: String,
    pub qr_data: QrPayload,
}

/// Issues a pass for a mock payment of the catalog price.
///
/// The validity window is `now` plus the pass type's duration in calendar
/// days. Payment and pass are stored in one transaction.
pub async fn issue_mock_pass<S: PassStore>(
    store: &S,
    user_id: Uuid,
    pass_type_id: Uuid,
    payment_reference: Option<String>,
    now: DateTime<Utc>,
) -> Result<IssuedPass> {
    let pass_type = store
        .find_pass_type(pass_type_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pass type not found".to_string()))?;

    let end = u64::try_from(pass_type.duration_days)
        .ok()
        .and_then(|days| now.checked_add_days(Days::new(days)))
        .ok_or_else(|| {
            AppError::InternalServerError(format!(
                "pass type {} has unusable duration {}",
                pass_type.id, pass_type.duration_days
            ))
        })?;

    let payload = QrPayload {
        user_id,
        pass_id: Uuid::new_v4(),
        pass_type: pass_type.name.clone(),
        start_date: now,
        end_date: end,
        timestamp: now.timestamp_millis(),
    };
    let encoded = payload
        .encode()
        .map_err(|e| AppError::InternalServerError(format!("failed to encode payload: {}", e)))?;
    let qr_code = qr::render_data_url(&encoded)?;

    let payment = NewPayment {
        id: Uuid::new_v4(),
        user_id,
        pass_type_id: pass_type.id,
        amount: pass_type.price,
        payment_method: MOCK_PAYMENT_METHOD.to_string(),
        payment_intent_id: payment_reference,
        status: PaymentStatus::Completed,
    };
    let pass = NewPass {
        id: Uuid::new_v4(),
        user_id,
        pass_type_id: pass_type.id,
        start_date: now.date_naive(),
        end_date: end.date_naive(),
        qr_code_data: encoded,
        payment_id: payment.id,
    };

    let (payment, pass) = store.issue_pass(payment, pass).await?;

    tracing::info!(
        pass_id = %pass.id,
        payment_id = %payment.id,
        user_id = %user_id,
        pass_type = %pass_type.name,
        end_date = %pass.end_date,
        "Pass issued"
    );

    Ok(IssuedPass {
        id: pass.id,
        pass_type: pass_type.name,
        start_date: now,
        end_date: end,
        qr_code,
        qr_data: payload,
    })
}
