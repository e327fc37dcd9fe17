use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use crate::ai::{GenAiClient, SuggestionService, TextGenerator};
use crate::auth::TokenKeys;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, TaskStore, UserStore};

/// Shared handles cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskStore>,
    pub users: Arc<dyn UserStore>,
    pub suggestions: SuggestionService,
    pub tokens: TokenKeys,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            tasks,
            users,
            suggestions: SuggestionService::new(generator),
            tokens: TokenKeys::new(&config.security).context("JWT_SECRET must be set")?,
            cors_origins: config.security.cors_origins.clone(),
        })
    }

    /// Stores backed by PostgreSQL, or by process memory when `in_memory`.
    /// The vendor client always comes from `config.genai`.
    pub fn from_config(config: &AppConfig, in_memory: bool) -> anyhow::Result<Self> {
        let generator: Arc<dyn TextGenerator> =
            Arc::new(GenAiClient::new(config.genai.clone()).context("building vendor HTTP client")?);
        info!("Task suggestions use the {} vendor", config.genai.provider);

        if in_memory {
            info!("Using in-memory task store");
            let store = Arc::new(MemoryStore::new());
            return Self::new(config, store.clone(), store, generator);
        }

        let manager = DatabaseManager::new(&config.database).context("DATABASE_URL must be set unless --in-memory is used")?;
        let store = Arc::new(PgStore::new(Arc::new(manager)));
        Self::new(config, store.clone(), store, generator)
    }
}
