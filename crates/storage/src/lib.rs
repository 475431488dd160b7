pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::error::Result;
use crate::repository::{MemoryStore, PgStore, PickStore};

/// Handle to the pick ledger, shared across request handlers.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn PickStore>,
    postgres: Option<PgStore>,
}

impl Database {
    /// Connects to PostgreSQL.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        let postgres = PgStore::new(pool);

        Ok(Self {
            store: Arc::new(postgres.clone()),
            postgres: Some(postgres),
        })
    }

    /// Process-local store; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    pub fn from_store(store: Arc<dyn PickStore>) -> Self {
        Self {
            store,
            postgres: None,
        }
    }

    pub fn store(&self) -> &dyn PickStore {
        self.store.as_ref()
    }

    /// Applies pending migrations. No-op for the in-memory store.
    pub async fn run_migrations(&self) -> Result<()> {
        match &self.postgres {
            Some(postgres) => postgres.run_migrations().await,
            None => Ok(()),
        }
    }

    pub async fn seed_reference_data(&self) -> Result<usize> {
        repository::seed_teams(self.store()).await
    }
}
