use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::models::UserPassView;
use crate::state::AppState;
use crate::store::PassStore;
use crate::utils::auth::AuthUser;
use crate::utils::error::Result;
use crate::utils::qr;

#[derive(Debug, Serialize)]
pub struct UserPassResponse {
    #[serde(flatten)]
    pub pass: UserPassView,
    /// Only present while the pass can still get its holder in.
    #[serde(rename = "qrCode")]
    pub qr_code: Option<String>,
}

pub async fn list_user_passes<S: PassStore>(
    State(state): State<AppState<S>>,
    caller: AuthUser,
) -> Result<Json<Vec<UserPassResponse>>> {
    let now = Utc::now();
    let passes = state.store.list_user_passes(caller.user_id()).await?;

    let passes = passes
        .into_iter()
        .map(|pass| -> Result<UserPassResponse> {
            let qr_code = if pass.is_usable_at(now) {
                Some(qr::render_data_url(&pass.qr_code_data)?)
            } else {
                None
            };
            Ok(UserPassResponse { pass, qr_code })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(passes))
}
