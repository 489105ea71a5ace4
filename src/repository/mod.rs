//! Repository layer: in-memory stores mirrored to the persistence sink
//!
//! Each collection lives behind its own `RwLock`. Operations touching several
//! collections take the locks in the order tools → events → consumables →
//! credentials.

pub mod consumables;
pub mod credentials;
pub mod events;
pub mod inventory;
pub mod seed;
pub mod tools;
pub mod users;

use std::{fmt, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    error::AppResult,
    models::{HistoryEvent, Tool, ToolDerivedStatus},
    storage::{self, Storage},
};

/// Millisecond-timestamp based ids for events, inventory and credentials
pub(crate) struct IdGenerator(snowflaked::Generator);

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self(snowflaked::Generator::new(0))
    }

    pub(crate) fn next_id(&mut self) -> i64 {
        let raw: u64 = self.0.generate();
        (raw & i64::MAX as u64) as i64
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdGenerator")
    }
}

/// Write a collection through to storage. Failures leave the in-memory state
/// authoritative and are only logged.
pub(crate) async fn persist<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) {
    let value = match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Could not encode {} for persistence: {}", key, e);
            return;
        }
    };
    if let Err(e) = storage.save(key, value).await {
        tracing::warn!("Persisting {} to {} failed, keeping memory state: {}", key, storage.backend(), e);
    }
}

pub(crate) async fn forget(storage: &dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key).await {
        tracing::warn!("Removing {} from {} failed: {}", key, storage.backend(), e);
    }
}

/// A persisted collection as read at start-up
#[derive(Debug)]
pub(crate) enum Stored<T> {
    /// The key was never written
    Missing,
    /// The backend failed or the blob is not a list. The start-up flush
    /// leaves such keys alone.
    Unreadable,
    Records(Vec<T>),
}

impl<T> Stored<T> {
    pub(crate) fn records(self) -> Option<Vec<T>> {
        match self {
            Stored::Records(records) => Some(records),
            Stored::Missing | Stored::Unreadable => None,
        }
    }

    pub(crate) fn is_unreadable(&self) -> bool {
        matches!(self, Stored::Unreadable)
    }
}

/// Key under which records that failed to decode are set aside
pub(crate) fn rejected_key(key: &str) -> String {
    format!("{}_rejected", key)
}

/// Read a persisted list record by record. Records that fail to decode are
/// dropped from memory and copied to the `<key>_rejected` key.
pub(crate) async fn load_records<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Stored<T> {
    let value = match storage.load(key).await {
        Ok(Some(value)) => value,
        Ok(None) => return Stored::Missing,
        Err(e) => {
            tracing::warn!("Loading {} from {} failed: {}", key, storage.backend(), e);
            return Stored::Unreadable;
        }
    };

    let items = match value {
        Value::Array(items) => items,
        other => {
            tracing::warn!("Persisted {} is not a list, leaving it untouched", key);
            persist(storage, &rejected_key(key), &other).await;
            return Stored::Unreadable;
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for item in items {
        match serde_json::from_value(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record in {}: {}", key, e);
                rejected.push(item);
            }
        }
    }
    if !rejected.is_empty() {
        persist(storage, &rejected_key(key), &rejected).await;
    }
    Stored::Records(records)
}

/// Main repository struct holding every store
#[derive(Clone)]
pub struct Repository {
    storage: Arc<dyn Storage>,
    pub tools: tools::ToolsRepository,
    pub events: events::EventsRepository,
    pub consumables: consumables::ConsumablesRepository,
    pub inventory: inventory::InventoryRepository,
    pub credentials: credentials::CredentialsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Empty stores backed by `storage`; nothing is read
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            tools: tools::ToolsRepository::new(storage.clone(), tools::ToolRegistry::default()),
            events: events::EventsRepository::new(storage.clone(), events::EventLog::default()),
            consumables: consumables::ConsumablesRepository::new(
                storage.clone(),
                consumables::ConsumableRegistry::default(),
            ),
            inventory: inventory::InventoryRepository::new(storage.clone(), inventory::Inventory::default()),
            credentials: credentials::CredentialsRepository::new(
                storage.clone(),
                credentials::CredentialVault::default(),
            ),
            users: users::UsersRepository::new(storage.clone(), users::UserRegistry::seeded()),
            storage,
        }
    }

    /// Restore every collection from storage, seeding what was never written
    pub async fn load(storage: Arc<dyn Storage>, seed_demo_data: bool) -> Self {
        let store = storage.as_ref();

        let tool_list: Stored<Tool> = load_records(store, storage::KEY_TOOLS).await;
        let consumable_list = load_records(store, storage::KEY_CONSUMABLES).await;
        let consumable_tools: Stored<String> = load_records(store, storage::KEY_CONSUMABLE_TOOLS).await;
        let stored_users = load_records(store, storage::KEY_USERS).await;

        let mut untouched = Vec::new();
        for (key, unreadable) in [
            (storage::KEY_TOOLS, tool_list.is_unreadable()),
            (storage::KEY_CONSUMABLES, consumable_list.is_unreadable()),
            (storage::KEY_CONSUMABLE_TOOLS, consumable_tools.is_unreadable()),
            (storage::KEY_USERS, stored_users.is_unreadable()),
        ] {
            if unreadable {
                untouched.push(key);
            }
        }

        let (tool_registry, consumable_registry) = match (tool_list.records(), consumable_list.records()) {
            (None, None) if seed_demo_data => {
                tracing::info!("No persisted tools found, seeding demo data");
                (seed::demo_tools(), seed::demo_consumables())
            }
            (tool_list, consumable_list) => (
                tools::ToolRegistry::from_tools(tool_list.unwrap_or_default()),
                consumables::ConsumableRegistry::from_parts(
                    consumable_list.unwrap_or_default(),
                    consumable_tools.records(),
                ),
            ),
        };

        let event_log = events::EventLog::from_events(
            load_records::<HistoryEvent>(store, storage::KEY_HISTORY)
                .await
                .records()
                .unwrap_or_default(),
        );
        let stock = inventory::Inventory::from_items(
            load_records(store, storage::KEY_INVENTORY)
                .await
                .records()
                .unwrap_or_default(),
        );
        let user_registry = match stored_users.records() {
            Some(users) => users::UserRegistry::from_users(users),
            None => users::UserRegistry::seeded(),
        };

        let mut vault = credentials::CredentialVault::default();
        for name in tool_registry.names() {
            if let Some(list) = load_records(store, &storage::credentials_key(&name)).await.records() {
                vault.insert_tool(name, list);
            }
        }

        tracing::info!(
            "Loaded {} tools, {} history events, {} consumables, {} users",
            tool_registry.tools().len(),
            event_log.events().len(),
            consumable_registry.consumables().len(),
            user_registry.users().len()
        );

        let repository = Self {
            tools: tools::ToolsRepository::new(storage.clone(), tool_registry),
            events: events::EventsRepository::new(storage.clone(), event_log),
            consumables: consumables::ConsumablesRepository::new(storage.clone(), consumable_registry),
            inventory: inventory::InventoryRepository::new(storage.clone(), stock),
            credentials: credentials::CredentialsRepository::new(storage.clone(), vault),
            users: users::UsersRepository::new(storage.clone(), user_registry),
            storage,
        };
        repository.flush(&untouched).await;
        repository
    }

    /// Drop every in-memory record (users return to the default accounts).
    /// Storage is left untouched.
    pub async fn reset(&self) {
        *self.tools.store().write().await = tools::ToolRegistry::default();
        *self.events.store().write().await = events::EventLog::default();
        *self.consumables.store().write().await = consumables::ConsumableRegistry::default();
        *self.inventory.store().write().await = inventory::Inventory::default();
        *self.credentials.store().write().await = credentials::CredentialVault::default();
        *self.users.store().write().await = users::UserRegistry::seeded();
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Write the seeded / loaded collections back so the next session reads
    /// them. Keys in `untouched` could not be read and are not overwritten.
    async fn flush(&self, untouched: &[&str]) {
        let store = self.storage.as_ref();
        let write = |key: &str| !untouched.iter().any(|k| *k == key);

        if write(storage::KEY_TOOLS) {
            persist(store, storage::KEY_TOOLS, self.tools.store().read().await.tools()).await;
        }
        let consumables = self.consumables.store().read().await;
        if write(storage::KEY_CONSUMABLES) {
            persist(store, storage::KEY_CONSUMABLES, consumables.consumables()).await;
        }
        if write(storage::KEY_CONSUMABLE_TOOLS) {
            persist(store, storage::KEY_CONSUMABLE_TOOLS, consumables.tool_names()).await;
        }
        drop(consumables);
        if write(storage::KEY_USERS) {
            persist(store, storage::KEY_USERS, self.users.store().read().await.users()).await;
        }
    }

    /// Rename a tool and carry the new name to every record that references it.
    /// Returns the old name, or `None` when no tool has this id.
    pub async fn rename_tool(&self, id: i32, new_name: &str) -> AppResult<Option<String>> {
        let mut tool_registry = self.tools.store().write().await;
        let old_name = match tool_registry.rename(id, new_name)? {
            Some(old) => old,
            None => return Ok(None),
        };
        if old_name == new_name {
            return Ok(Some(old_name));
        }
        let mut event_log = self.events.store().write().await;
        let mut consumable_registry = self.consumables.store().write().await;
        let mut vault = self.credentials.store().write().await;

        let moved_events = event_log.rename_tool(&old_name, new_name);
        let moved_parts = consumable_registry.rename_tool(&old_name, new_name);
        let moved_credentials = vault.rename_tool(&old_name, new_name);

        let store = self.storage.as_ref();
        persist(store, storage::KEY_TOOLS, tool_registry.tools()).await;
        if moved_events > 0 {
            persist(store, storage::KEY_HISTORY, event_log.events()).await;
        }
        persist(store, storage::KEY_CONSUMABLES, consumable_registry.consumables()).await;
        persist(store, storage::KEY_CONSUMABLE_TOOLS, consumable_registry.tool_names()).await;
        if moved_credentials {
            persist(store, &storage::credentials_key(new_name), vault.list(new_name)).await;
            forget(store, &storage::credentials_key(&old_name)).await;
        }

        tracing::info!(
            "Renamed tool {} -> {} ({} events, {} consumables)",
            old_name,
            new_name,
            moved_events,
            moved_parts
        );
        Ok(Some(old_name))
    }

    /// Remove a tool with its consumables and credentials. History is kept.
    pub async fn remove_tool(&self, id: i32) -> Option<Tool> {
        let mut tool_registry = self.tools.store().write().await;
        let removed = tool_registry.remove(id)?;
        let mut consumable_registry = self.consumables.store().write().await;
        let mut vault = self.credentials.store().write().await;

        let dropped_parts = consumable_registry.delete_by_tool(&removed.name);
        let had_credentials = vault.remove_tool(&removed.name);

        let store = self.storage.as_ref();
        persist(store, storage::KEY_TOOLS, tool_registry.tools()).await;
        persist(store, storage::KEY_CONSUMABLES, consumable_registry.consumables()).await;
        persist(store, storage::KEY_CONSUMABLE_TOOLS, consumable_registry.tool_names()).await;
        if had_credentials {
            forget(store, &storage::credentials_key(&removed.name)).await;
        }

        tracing::info!("Removed tool {} ({} consumables dropped)", removed.name, dropped_parts);
        Some(removed)
    }

    /// Recompute the derived status of every tool from the current event log.
    ///
    /// The tools write lock is held while the log is read, so concurrent
    /// recomputes are serialised and always see the latest events.
    pub async fn apply_derived_status<F>(&self, derive: F) -> usize
    where
        F: Fn(&[HistoryEvent], &str) -> ToolDerivedStatus,
    {
        let mut tool_registry = self.tools.store().write().await;
        let event_log = self.events.store().read().await;

        let mut changed = 0;
        for name in tool_registry.names() {
            let derived = derive(event_log.events(), &name);
            if tool_registry.apply_derived_status(&name, derived) {
                changed += 1;
            }
        }
        drop(event_log);

        if changed > 0 {
            persist(self.storage.as_ref(), storage::KEY_TOOLS, tool_registry.tools()).await;
        }
        changed
    }
}
