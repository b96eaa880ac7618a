use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;

use super::store::StoreError;

/// Connection pool construction and schema migration for the PostgreSQL backend
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to `config.url` and apply pending migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Option<PgPool>, StoreError> {
        let Some(url) = config.url.as_deref() else {
            return Ok(None);
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        info!("Connected to {}", Self::redact(url));

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");

        Ok(Some(pool))
    }

    /// Strip credentials from a connection URL before it reaches the logs
    fn redact(database_url: &str) -> String {
        match url::Url::parse(database_url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    let _ = url.set_password(Some("****"));
                }
                url.to_string()
            }
            Err(_) => "<unparseable database url>".to_string(),
        }
    }
}
