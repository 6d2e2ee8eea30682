use axum::extract::State;
use axum::Json;

use crate::models::PoolEntryView;
use crate::state::AppState;
use crate::store::PassStore;
use crate::utils::auth::AuthUser;
use crate::utils::error::Result;

const RECENT_ENTRIES_LIMIT: i64 = 100;

pub async fn list_pool_entries<S: PassStore>(
    State(state): State<AppState<S>>,
    _caller: AuthUser,
) -> Result<Json<Vec<PoolEntryView>>> {
    Ok(Json(state.store.recent_entries(RECENT_ENTRIES_LIMIT).await?))
}
