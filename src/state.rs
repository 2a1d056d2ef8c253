use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::auth::service::AuthService;
use crate::auth::store::{PgSessionStore, PgUserStore};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let keys = JwtKeys::new(&config.jwt);
        let auth = AuthService::new(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgSessionStore::new(db.clone())),
            keys,
        );

        Ok(Self { db, config, auth })
    }
}
