pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod memory;
pub mod validation;

use std::path::Path;

use db::DbPool;
pub use db::models::{ChatTurn, ConversationSummary, Memory, MemoryStats, Persona, Role};
pub use engine::ChatEngine;
pub use error::AppError;
pub use memory::MemoryStore;

/// Shared application state: one instance per process, constructed at startup
/// and handed to the embedding request handler.
pub struct ChatState {
    /// Catalog + kv persistence. `None` when the storage medium is
    /// unavailable; the memory store then runs in-memory only.
    pub db: Option<DbPool>,
    pub engine: ChatEngine,
}

impl ChatState {
    /// Initialize with the provider resolved from environment configuration.
    ///
    /// Configuration problems (missing API key) fail construction. Storage
    /// problems do not: the store degrades to in-memory operation.
    pub fn init(app_data_dir: &Path) -> Result<Self, AppError> {
        let provider = engine::provider::from_env()?;
        Ok(Self::init_with_provider(app_data_dir, provider))
    }

    /// Initialize with an explicit completion provider.
    pub fn init_with_provider(
        app_data_dir: &Path,
        provider: Box<dyn engine::provider::CompletionProvider>,
    ) -> Self {
        let pool = match db::init_db(app_data_dir) {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::error!("Storage unavailable, continuing without persistence: {e}");
                None
            }
        };

        let store = MemoryStore::new(pool.clone());
        Self { db: pool, engine: ChatEngine::new(store, provider) }
    }
}
