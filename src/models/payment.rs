use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const MOCK_PAYMENT_METHOD: &str = "mock_payment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Completed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
        }
    }
}

/// A recorded payment. Rows are written together with the pass they fund
/// and never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pass_type_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_intent_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pass_type_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_intent_id: Option<String>,
    pub status: PaymentStatus,
}
