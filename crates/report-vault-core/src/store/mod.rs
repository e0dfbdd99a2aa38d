//! Keyed persistence abstraction for Report Vault.
//!
//! The [`KeyValueStore`] trait is the only way report data reaches durable
//! storage. Keys are plain strings and values are UTF-8 text; the store
//! knows nothing about reports. Backends: [`memory::InMemoryKvStore`] here,
//! and the SQLite-backed store in the `report-vault` crate.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// Key of the pre-namespacing entry that held every report regardless of user.
pub const LEGACY_KEY: &str = "reports";

/// Prefix of the per-user entry; the full key is `reports_<user_id>`.
pub const USER_KEY_PREFIX: &str = "reports_";

/// Persisted key holding the report collection of `user_id`.
pub fn user_key(user_id: &str) -> String {
    format!("{}{}", USER_KEY_PREFIX, user_id)
}

/// Abstract string-keyed durable store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`get`](KeyValueStore::get) | Read the value at a key |
/// | [`set`](KeyValueStore::set) | Create or overwrite the value at a key |
/// | [`delete`](KeyValueStore::delete) | Remove a key; absent keys are not an error |
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored at `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` at `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
