use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::database::models::{Asset, BrandKit, Quote, Template};
use crate::database::seed::{seed_global_templates, seed_starter_quotes};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store, StoreError};
use crate::services::{FileStorage, HttpRenderer, Renderer, Rewriter};

/// Shared collaborators handed to every handler through axum `State`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthGate>,
    pub quotes: Arc<dyn Store<Quote>>,
    pub assets: Arc<dyn Store<Asset>>,
    pub templates: Arc<dyn Store<Template>>,
    pub brand_kits: Arc<dyn Store<BrandKit>>,
    pub renderer: Arc<dyn Renderer>,
    pub rewriter: Rewriter,
    pub storage: FileStorage,
}

impl AppState {
    /// Build state for `config`: PostgreSQL when `DATABASE_URL` is set,
    /// in-memory stores otherwise.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let renderer = Arc::new(HttpRenderer::new(&config.render)?);
        let state = match DatabaseManager::connect(&config.database).await? {
            Some(pool) => Self::postgres(config, pool, renderer)?,
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores");
                Self::in_memory(config, renderer)?
            }
        };
        seed_global_templates(state.templates.as_ref()).await?;
        seed_starter_quotes(state.quotes.as_ref()).await?;
        Ok(state)
    }

    pub fn in_memory(config: AppConfig, renderer: Arc<dyn Renderer>) -> Result<Self, crate::services::StorageError> {
        Self::assemble(
            config,
            renderer,
            Arc::new(MemoryStore::<Quote>::new()),
            Arc::new(MemoryStore::<Asset>::new()),
            Arc::new(MemoryStore::<Template>::new()),
            Arc::new(MemoryStore::<BrandKit>::new()),
        )
    }

    pub fn postgres(
        config: AppConfig,
        pool: PgPool,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, crate::services::StorageError> {
        Self::assemble(
            config,
            renderer,
            Arc::new(PgStore::<Quote>::new(pool.clone())),
            Arc::new(PgStore::<Asset>::new(pool.clone())),
            Arc::new(PgStore::<Template>::new(pool.clone())),
            Arc::new(PgStore::<BrandKit>::new(pool)),
        )
    }

    fn assemble(
        config: AppConfig,
        renderer: Arc<dyn Renderer>,
        quotes: Arc<dyn Store<Quote>>,
        assets: Arc<dyn Store<Asset>>,
        templates: Arc<dyn Store<Template>>,
        brand_kits: Arc<dyn Store<BrandKit>>,
    ) -> Result<Self, crate::services::StorageError> {
        Ok(Self {
            auth: Arc::new(AuthGate::new(&config.security)),
            storage: FileStorage::new(&config.storage)?,
            rewriter: Rewriter::from_config(&config.ai),
            config: Arc::new(config),
            quotes,
            assets,
            templates,
            brand_kits,
            renderer,
        })
    }

    /// Readiness of the backing store, used by `/health`
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.quotes.ping().await
    }
}
