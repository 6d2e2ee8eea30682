use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, SecurityHeaders};
use crate::handlers::auth::{login, register};
use crate::handlers::catalog::list_pass_types;
use crate::handlers::entries::list_pool_entries;
use crate::handlers::gate::verify_qr;
use crate::handlers::health_check;
use crate::handlers::passes::list_user_passes;
use crate::handlers::payments::mock_process;
use crate::state::AppState;
use crate::store::PassStore;

pub fn create_routes<S: PassStore>(state: AppState<S>) -> Router {
    let security = SecurityHeaders::from_config(&state.config);

    let api = Router::new()
        .route("/auth/register", post(register::<S>))
        .route("/auth/login", post(login::<S>))
        .route("/pass-types", get(list_pass_types::<S>))
        .route("/payments/mock-process", post(mock_process::<S>))
        .route("/user-passes", get(list_user_passes::<S>))
        .route("/verify-qr", post(verify_qr::<S>))
        .route("/pool-entries", get(list_pool_entries::<S>));

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .with_state(state);

    security
        .apply(router)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}
