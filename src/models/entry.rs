use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One granted entry at the gate. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntryEvent {
    pub id: Uuid,
    pub user_pass_id: Uuid,
    pub user_id: Uuid,
    pub staff_id: String,
    pub entry_time: DateTime<Utc>,
}

/// Entry joined with the holder and pass type, for the staff entry log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PoolEntryView {
    pub id: Uuid,
    pub entry_time: DateTime<Utc>,
    pub staff_id: String,
    pub full_name: String,
    pub email: String,
    pub pass_type_name: String,
}
