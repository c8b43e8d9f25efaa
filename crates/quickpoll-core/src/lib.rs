pub mod error;
pub mod observability;
pub mod poll;
pub mod store;

use std::time::Duration;

pub use error::{CoreError, Resource};
pub use poll::PageLimits;
pub use store::Store;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub page_limits: PageLimits,
    pub store_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            page_limits: PageLimits::default(),
            store_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: quickpoll_db::DbPool, config: AppConfig) -> Self {
        Self {
            store: Store::new(db, config.store_timeout),
            config,
        }
    }
}
