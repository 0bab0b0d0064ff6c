use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{TokenService, token};
use crate::soap::Dispatcher;

/// Shared state wired once at startup and handed to the HTTP layer and
/// the scheduler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub tokens: Arc<TokenService>,

    pub dispatcher: Dispatcher,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let store = Store::open(&config.general.data_dir).await?;

        let secret = token::load_or_generate_secret(&config).await?;
        let tokens = Arc::new(TokenService::new(
            secret,
            config.security.token_ttl_seconds,
            config.security.revocation_default_ttl_seconds,
            Arc::new(store.clone()),
        ));

        let dispatcher = Dispatcher::new(store.clone(), tokens.clone(), config.security.clone());

        Ok(Arc::new(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            tokens,
            dispatcher,
        }))
    }
}
