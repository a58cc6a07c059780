//! Notekeeper - minimal multi-user note-taking HTTP service
//!
//! Users sign up, log in to obtain a session token, and create, list and
//! delete their own notes. Everything is held in memory:
//! - `store`: users, sessions and notes behind coarse mutexes
//! - `api`: axum handlers for `/signup`, `/login` and `/notes`
//! - `config`: TOML server and logging settings
//!
//! # Usage
//!
//! As a library:
//! ```ignore
//! use notekeeper::{Config, Core};
//!
//! let core = Core::new(Config::default());
//! core.start_api_server().await?;
//! ```
//!
//! As a standalone server (CLI):
//! ```text
//! notekeeper --port 3000
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{CoreError, Result, StoreError};
pub use store::Store;

use std::sync::Arc;

/// Core service tying the configuration to a store instance
pub struct Core {
    /// Configuration
    pub config: Config,

    /// In-memory store shared with the API handlers
    store: Arc<Store>,
}

impl Core {
    /// Create a new Core instance with an empty store
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(Store::new()))
    }

    /// Create a Core instance around an existing store
    pub fn with_store(config: Config, store: Arc<Store>) -> Self {
        Core { config, store }
    }

    /// Start the HTTP API server
    pub async fn start_api_server(&self) -> Result<()> {
        let addr = self.config.server_addr();
        tracing::info!("Starting API server on {}", addr);
        api::serve(addr, self.store.clone()).await
    }

    /// Get a reference to the store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}
