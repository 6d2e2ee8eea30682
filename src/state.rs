use std::sync::Arc;

use crate::config::Config;
use crate::store::PassStore;
use crate::utils::auth::TokenKeys;

/// Shared handler state. Cheap to clone: the store is a pool handle and the
/// rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenKeys>,
}

impl<S: PassStore> AppState<S> {
    pub fn new(store: S, config: Config) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.jwt_ttl_hours);

        Self {
            store,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
        }
    }
}
