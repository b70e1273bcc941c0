// Application state module
// Shared by every connection: configuration and the message store

use super::types::Config;
use crate::error::AppError;
use crate::store::JsonStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: JsonStore,
}

impl AppState {
    /// Create `AppState`, preparing the backing store file if it is missing
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let store = JsonStore::open(&config.storage.path).await?;

        Ok(Self {
            config: config.clone(),
            store,
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
