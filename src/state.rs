use std::sync::Arc;

use tracing::{info, warn};

use coffeeshop_auth::Authorizer;
use coffeeshop_config::{AuthConfig, CorsConfig, DatabaseConfig};
use coffeeshop_db::{init_db_pool, run_migrations};

use crate::modules::drinks::repository::{
    DrinkRepository, InMemoryDrinkRepository, PgDrinkRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkRepository>,
    pub authorizer: Authorizer,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        drinks: Arc<dyn DrinkRepository>,
        authorizer: Authorizer,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            drinks,
            authorizer,
            cors_config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("authorizer", &self.authorizer)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

/// Builds the state from the environment.
///
/// Without `DATABASE_URL` drinks are kept in memory and lost on restart.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let authorizer = Authorizer::from_config(&AuthConfig::from_env())?;

    let drinks: Arc<dyn DrinkRepository> = match DatabaseConfig::from_env() {
        Some(config) => {
            let pool = init_db_pool(&config).await?;
            run_migrations(&pool).await?;
            Arc::new(PgDrinkRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, storing drinks in memory");
            Arc::new(InMemoryDrinkRepository::with_seed())
        }
    };

    info!("Application state initialized");

    Ok(AppState::new(drinks, authorizer, CorsConfig::from_env()))
}
