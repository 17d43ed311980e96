//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use sqlx::PgPool;

use pantry_manager_core::Recipe;

use crate::config::ServerConfig;
use crate::llm::{LlmClient, LlmError};

/// Upper bound on distinct ingredient sets kept in the recipe cache.
const RECIPE_CACHE_CAPACITY: u64 = 1000;

/// Cached recipe suggestions, keyed by normalized ingredient set.
pub type RecipeCache = Cache<String, Arc<Vec<Recipe>>>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    llm: LlmClient,
    recipe_cache: RecipeCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the language model client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, LlmError> {
        let llm = LlmClient::new(&config.llm)?;
        let recipe_cache = Cache::builder()
            .max_capacity(RECIPE_CACHE_CAPACITY)
            .time_to_live(config.recipe_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                llm,
                recipe_cache,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the language model client.
    #[must_use]
    pub fn llm(&self) -> &LlmClient {
        &self.inner.llm
    }

    /// Get a reference to the recipe suggestion cache.
    #[must_use]
    pub fn recipe_cache(&self) -> &RecipeCache {
        &self.inner.recipe_cache
    }
}
