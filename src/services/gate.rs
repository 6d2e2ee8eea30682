//! Entry decisions at the pool gate.
//!
//! A scan is parsed, matched against the active pass holding exactly that
//! payload, checked against the pass end date and, when admitted, written
//! to the entry log. Denials are terminal for the scan; staff re-scan by
//! hand.

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::QrPayload;
use crate::store::PassStore;
use crate::utils::error::Result;

pub const DEFAULT_STAFF_ID: &str = "staff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenialReason {
    #[error("Invalid QR code format")]
    MalformedPayload,

    #[error("Invalid or expired pass")]
    NotFoundOrInactive,

    #[error("Pass has expired")]
    Expired,
}

impl DenialReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenialReason::MalformedPayload => "MALFORMED_PAYLOAD",
            DenialReason::NotFoundOrInactive => "NOT_FOUND_OR_INACTIVE",
            DenialReason::Expired => "EXPIRED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DenialReason::MalformedPayload | DenialReason::Expired => StatusCode::BAD_REQUEST,
            DenialReason::NotFoundOrInactive => StatusCode::NOT_FOUND,
        }
    }
}

/// Who was let in, echoed back to the staff scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub name: String,
    pub email: String,
    pub pass_type: String,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Granted(Grant),
    Denied(DenialReason),
}

/// Blank or missing staff ids are logged as [`DEFAULT_STAFF_ID`].
pub fn staff_id_or_default(staff_id: Option<&str>) -> &str {
    staff_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_STAFF_ID)
}

/// Decides whether `payload` admits its holder at `now`.
///
/// Storage failures come back as `Err`; every other outcome is a
/// [`Verdict`]. Only two writes can happen: expiring a past-due pass, or
/// appending one entry event on a grant.
pub async fn verify<S: PassStore>(
    store: &S,
    payload: &str,
    staff_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Verdict> {
    if let Err(e) = QrPayload::parse(payload) {
        tracing::debug!(error = %e, "Scanned payload did not parse");
        return Ok(Verdict::Denied(DenialReason::MalformedPayload));
    }

    let Some(pass) = store.find_active_pass(payload).await? else {
        return Ok(Verdict::Denied(DenialReason::NotFoundOrInactive));
    };

    if pass.is_expired_at(now) {
        let transitioned = store.expire_pass(pass.id).await?;
        tracing::info!(
            pass_id = %pass.id,
            end_date = %pass.end_date,
            transitioned,
            "Past-due pass scanned, marked expired"
        );
        return Ok(Verdict::Denied(DenialReason::Expired));
    }

    let staff_id = staff_id_or_default(staff_id);
    let Some(entry) = store.record_entry(pass.id, pass.user_id, staff_id).await? else {
        // Another scan expired the pass between lookup and insert
        return Ok(Verdict::Denied(DenialReason::NotFoundOrInactive));
    };

    tracing::info!(
        pass_id = %pass.id,
        entry_id = %entry.id,
        staff_id = %entry.staff_id,
        "Entry granted"
    );

    Ok(Verdict::Granted(Grant {
        name: pass.full_name,
        email: pass.email,
        pass_type: pass.pass_type_name,
        valid_until: pass.end_date,
    }))
}
