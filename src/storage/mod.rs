//! Key-value persistence sinks
//!
//! Every collection is mirrored as one JSON blob per key. Backends may be
//! unavailable; callers treat a failed write as "memory only for now".

pub mod file;
pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::AppResult,
};

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;
pub use self::redis::RedisStorage;

pub const KEY_TOOLS: &str = "tools";
pub const KEY_HISTORY: &str = "historyItems";
pub const KEY_CONSUMABLES: &str = "consumables";
pub const KEY_CONSUMABLE_TOOLS: &str = "consumableTools";
pub const KEY_INVENTORY: &str = "consumablesInventory";
pub const KEY_USERS: &str = "users";

/// Key of a tool's credential list
pub fn credentials_key(tool_name: &str) -> String {
    format!("passwords_{}", tool_name)
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a blob, `None` when the key was never written
    async fn load(&self, key: &str) -> AppResult<Option<Value>>;

    async fn save(&self, key: &str, value: Value) -> AppResult<()>;

    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;
}

/// Open the configured backend, falling back to memory when it is unreachable
pub async fn connect(config: &StorageConfig) -> Arc<dyn Storage> {
    let opened: AppResult<Arc<dyn Storage>> = match config.backend {
        StorageBackend::File => FileStorage::open(&config.path)
            .await
            .map(|s| Arc::new(s) as Arc<dyn Storage>),
        StorageBackend::Redis => RedisStorage::new(&config.redis_url, &config.key_prefix)
            .await
            .map(|s| Arc::new(s) as Arc<dyn Storage>),
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
    };

    match opened {
        Ok(storage) => {
            tracing::info!("Persistence backend: {}", storage.backend());
            storage
        }
        Err(e) => {
            tracing::warn!(
                "Persistence backend {:?} unavailable ({}), state is memory-only for this session",
                config.backend,
                e
            );
            Arc::new(MemoryStorage::new())
        }
    }
}
