use axum::extract::State;
use axum::Json;

use crate::models::PassType;
use crate::state::AppState;
use crate::store::PassStore;
use crate::utils::error::Result;

pub async fn list_pass_types<S: PassStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<PassType>>> {
    Ok(Json(state.store.list_pass_types().await?))
}
