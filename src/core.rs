//! Core HStoreHaus functionality
//!
//! This module contains the main HStoreHaus struct and its implementation,
//! providing centralized coordination for the database pool, hstore settings
//! and per-table hstore managers.

use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use store_object::{HStoreManager, PgRecordProvider, ReferenceFormat};

use crate::errors::HStoreHausError;
use config::{AppConfig, DatabaseConfig, HStoreConfig};

/// Main HStoreHaus coordinator that manages the database connection and hstore managers
pub struct HStoreHaus {
    pool: PgPool,
    hstore: HStoreConfig,
    managers: HashMap<String, HStoreManager>,
}

impl HStoreHaus {
    /// Create new HStoreHaus with database connection and default hstore settings
    pub async fn new(config: DatabaseConfig) -> Result<Self, HStoreHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&connection_string).await?;
        tracing::info!(
            "Connected to PostgreSQL at {}:{}/{}",
            config.host,
            config.port,
            config.database
        );

        Ok(Self::from_pool(pool))
    }

    /// Create HStoreHaus from a full application configuration
    pub async fn from_config(config: AppConfig) -> Result<Self, HStoreHausError> {
        config.hstore.validate()?;
        let mut haus = Self::new(config.database).await?;
        haus.hstore = config.hstore;
        Ok(haus)
    }

    /// Wrap an existing pool with default hstore settings
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            hstore: HStoreConfig::default(),
            managers: HashMap::new(),
        }
    }

    /// Replace the hstore settings
    pub fn with_hstore_config(mut self, hstore: HStoreConfig) -> Result<Self, HStoreHausError> {
        hstore.validate()?;
        self.hstore = hstore;
        Ok(self)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn hstore_config(&self) -> &HStoreConfig {
        &self.hstore
    }

    /// Reference identifier format from the hstore settings
    pub fn reference_format(&self) -> ReferenceFormat {
        ReferenceFormat::from(&self.hstore)
    }

    /// Create an unregistered manager for `table` on this pool
    pub fn manager(&self, table: &str) -> Result<HStoreManager, HStoreHausError> {
        Ok(HStoreManager::new(self.pool.clone(), table)?)
    }

    /// Register a manager under its table name
    pub fn register_manager(&mut self, manager: HStoreManager) -> Result<(), HStoreHausError> {
        let name = manager.table_name().to_string();
        if self.managers.contains_key(&name) {
            return Err(HStoreHausError::ManagerAlreadyRegistered(name));
        }

        store_object::debug_log!("Registered hstore manager for '{}'", name);
        self.managers.insert(name, manager);
        Ok(())
    }

    /// Get a registered manager by table name
    pub fn get_manager(&self, table: &str) -> Result<&HStoreManager, HStoreHausError> {
        self.managers
            .get(table)
            .ok_or_else(|| HStoreHausError::ManagerNotFound(table.to_string()))
    }

    /// List all registered table names
    pub fn list_managers(&self) -> Vec<&String> {
        self.managers.keys().collect()
    }

    /// Remove a manager by table name
    pub fn unregister_manager(&mut self, table: &str) -> Result<HStoreManager, HStoreHausError> {
        self.managers
            .remove(table)
            .ok_or_else(|| HStoreHausError::ManagerNotFound(table.to_string()))
    }

    /// Record provider for resolving lazy references to `E`
    pub fn record_provider<E>(&self) -> PgRecordProvider<E> {
        PgRecordProvider::new(self.pool.clone())
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), HStoreHausError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Whether the hstore extension is installed in the connected database
    pub async fn hstore_available(&self) -> Result<bool, HStoreHausError> {
        let available: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pg_extension WHERE extname = 'hstore')",
        )
        .fetch_one(&self.pool)
        .await?;

        if !available {
            tracing::warn!("The hstore extension is not installed in the connected database");
        }
        Ok(available)
    }
}
