use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Active,
    Expired,
    Cancelled,
}

impl PassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PassStatus::Active => "active",
            PassStatus::Expired => "expired",
            PassStatus::Cancelled => "cancelled",
        }
    }
}

/// An issued pass. `qr_code_data` holds the exact payload string handed to
/// the holder; the gate matches on it byte for byte.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pass {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pass_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub qr_code_data: String,
    pub payment_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPass {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pass_type_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub qr_code_data: String,
    pub payment_id: Uuid,
}

/// The record encoded into a pass QR code.
///
/// Every field is required: a scan that decodes to anything less is
/// rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub user_id: Uuid,
    pub pass_id: Uuid,
    pub pass_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Issuance time in epoch milliseconds.
    pub timestamp: i64,
}

impl QrPayload {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// An active pass joined with its holder and type, as seen by the gate.
#[derive(Debug, Clone, FromRow)]
pub struct ActivePass {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pass_type_name: String,
    pub full_name: String,
    pub email: String,
}

/// The instant a pass stops admitting: 00:00 UTC on its end date.
fn expires_at(end_date: NaiveDate) -> DateTime<Utc> {
    end_date.and_time(NaiveTime::MIN).and_utc()
}

impl ActivePass {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= expires_at(self.end_date)
    }
}

/// A holder's pass as listed on their dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPassView {
    pub id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub qr_code_data: String,
    pub created_at: DateTime<Utc>,
    pub pass_type_name: String,
    pub price: Decimal,
    pub duration_days: i32,
}

impl UserPassView {
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PassStatus::Active.as_str() && now < expires_at(self.end_date)
    }
}
