//! Per-user report store.
//!
//! [`ReportStore`] is the single source of truth for "this user's reports"
//! during a session. It keeps the collection in memory, newest first, and
//! writes the whole collection back through the injected [`KeyValueStore`]
//! after every mutation.
//!
//! Nothing here returns an error to the caller. Corrupt persisted text,
//! unreachable storage and lookup misses all degrade to an empty collection
//! or `None`, and are reported through `tracing` and the typed
//! [`LoadOutcome`] / [`LoadStatus`] values.
//!
//! Only a persisted entry that is not a JSON array counts as corrupt. Array
//! elements that do not decode as a [`Report`] are carried verbatim and
//! written back after the readable reports on every persist.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::migration::{migrate_legacy, MigrationOutcome};
use crate::models::Report;
use crate::store::{user_key, KeyValueStore};

/// A decoded persisted entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredCollection {
    /// Elements that decoded as reports, in stored order.
    pub reports: Vec<Report>,
    /// Elements that did not, kept as stored.
    pub unreadable: Vec<Value>,
}

impl StoredCollection {
    fn decode(entries: Vec<Value>) -> Self {
        let mut collection = Self::default();
        for entry in entries {
            match serde_json::from_value::<Report>(entry.clone()) {
                Ok(report) => collection.reports.push(report),
                Err(e) => {
                    debug!(error = %e, "keeping undecodable report entry verbatim");
                    collection.unreadable.push(entry);
                }
            }
        }
        collection
    }
}

/// Result of reading one persisted collection.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The entry was present and is a JSON array.
    Loaded(StoredCollection),
    /// No entry (or an empty one) at the key.
    Missing,
    /// The entry was present but is not a JSON array.
    Corrupt { error: String },
    /// The backend failed to read the key.
    Unavailable { error: String },
}

impl LoadOutcome {
    /// The parsed collection, or an empty one for every fallback branch.
    pub fn into_reports(self) -> Vec<Report> {
        match self {
            LoadOutcome::Loaded(collection) => collection.reports,
            _ => Vec::new(),
        }
    }
}

/// Parse persisted text into a report collection.
///
/// Fails only when the text is not a JSON array.
pub fn decode_collection(raw: &str) -> LoadOutcome {
    if raw.is_empty() {
        return LoadOutcome::Missing;
    }
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => LoadOutcome::Loaded(StoredCollection::decode(entries)),
        Err(e) => LoadOutcome::Corrupt {
            error: e.to_string(),
        },
    }
}

/// Read and parse the collection stored at `key`.
pub async fn read_collection(kv: &dyn KeyValueStore, key: &str) -> LoadOutcome {
    match kv.get(key).await {
        Ok(Some(raw)) => decode_collection(&raw),
        Ok(None) => LoadOutcome::Missing,
        Err(e) => LoadOutcome::Unavailable {
            error: format!("{:#}", e),
        },
    }
}

/// How [`ReportStore::initialize`] arrived at its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No user identity; nothing was read.
    NoUser,
    /// The user-scoped entry was loaded.
    Loaded { count: usize },
    /// The legacy entry was moved into the user's namespace and loaded.
    Migrated { count: usize },
    /// No persisted data for the user.
    Empty,
    /// Persisted data could not be used; the collection starts empty.
    Recovered { reason: String },
}

/// The active user's report collection, synchronized to a [`KeyValueStore`].
///
/// Every mutation re-serializes the entire collection; there is no
/// incremental persistence. Collections are assumed to stay small.
///
/// Mutating methods take `&mut self`, so a store value has exactly one
/// writer. Sharing one across tasks requires an outer mutex around each
/// read-modify-persist call.
pub struct ReportStore {
    kv: Arc<dyn KeyValueStore>,
    user_id: Option<String>,
    reports: Vec<Report>,
    unreadable: Vec<Value>,
}

impl ReportStore {
    /// Create a store with no active user and an empty collection.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            user_id: None,
            reports: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The in-memory collection, newest first.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Persisted entries that could not be read as reports.
    pub fn unreadable(&self) -> &[Value] {
        &self.unreadable
    }

    /// Bind the store to `user_id` and load that user's collection.
    ///
    /// Replaces the in-memory collection outright; nothing from a previous
    /// user survives. Must be called again whenever the identity changes,
    /// including sign-out (`None`). Runs the legacy migration first, then
    /// reads the user-scoped entry. Nothing is written when the user has no
    /// data yet.
    pub async fn initialize(&mut self, user_id: Option<&str>) -> LoadStatus {
        self.reports = Vec::new();
        self.unreadable = Vec::new();
        self.user_id = user_id.map(str::to_string);

        let Some(user_id) = user_id else {
            debug!("no active user, report collection cleared");
            return LoadStatus::NoUser;
        };

        let (outcome, migrated) = match migrate_legacy(self.kv.as_ref(), user_id).await {
            MigrationOutcome::Migrated(collection) => (LoadOutcome::Loaded(collection), true),
            _ => (
                read_collection(self.kv.as_ref(), &user_key(user_id)).await,
                false,
            ),
        };

        let status = match outcome {
            LoadOutcome::Loaded(collection) => {
                let count = collection.reports.len();
                if !collection.unreadable.is_empty() {
                    warn!(
                        user_id,
                        skipped = collection.unreadable.len(),
                        "some stored reports could not be read, keeping them as-is"
                    );
                }
                self.reports = collection.reports;
                self.unreadable = collection.unreadable;
                if migrated {
                    LoadStatus::Migrated { count }
                } else {
                    LoadStatus::Loaded { count }
                }
            }
            LoadOutcome::Missing => LoadStatus::Empty,
            LoadOutcome::Corrupt { error } => {
                warn!(user_id, %error, "persisted reports are unreadable, starting empty");
                LoadStatus::Recovered { reason: error }
            }
            LoadOutcome::Unavailable { error } => {
                warn!(user_id, %error, "report storage unavailable, starting empty");
                LoadStatus::Recovered { reason: error }
            }
        };

        info!(user_id, count = self.reports.len(), "reports loaded");
        status
    }

    /// Insert `report` at the head of the collection and persist.
    pub async fn add(&mut self, report: Report) {
        debug!(id = %report.id, "adding report");
        self.reports.insert(0, report);
        self.persist().await;
    }

    /// Find a report by id.
    ///
    /// Looks in memory first, then falls back to re-reading the persisted
    /// user entry.
    pub async fn get(&self, id: &str) -> Option<Report> {
        if let Some(found) = self.reports.iter().find(|r| r.id == id) {
            return Some(found.clone());
        }

        let user_id = self.user_id.as_deref()?;
        match read_collection(self.kv.as_ref(), &user_key(user_id)).await {
            LoadOutcome::Loaded(collection) => collection.reports.into_iter().find(|r| r.id == id),
            LoadOutcome::Corrupt { error } | LoadOutcome::Unavailable { error } => {
                warn!(user_id, %error, "fallback report lookup failed");
                None
            }
            LoadOutcome::Missing => None,
        }
    }

    /// Remove the report with `id`, if any, and persist.
    pub async fn delete(&mut self, id: &str) {
        let before = self.reports.len();
        self.reports.retain(|r| r.id != id);
        if self.reports.len() == before {
            debug!(id, "delete of unknown report");
        }
        self.persist().await;
    }

    /// Drop every report of `user_id`, in memory and in storage.
    ///
    /// The persisted entry is deleted, not overwritten with an empty list.
    /// The in-memory collection is only emptied when `user_id` is the
    /// active user.
    pub async fn clear(&mut self, user_id: &str) {
        if self.user_id.as_deref() == Some(user_id) {
            self.reports.clear();
            self.unreadable.clear();
        } else {
            warn!(user_id, "clearing reports of a user that is not active");
        }
        if let Err(e) = self.kv.delete(&user_key(user_id)).await {
            warn!(user_id, error = %format!("{:#}", e), "failed to delete persisted reports");
        } else {
            info!(user_id, "reports cleared");
        }
    }

    async fn persist(&self) {
        let Some(user_id) = self.user_id.as_deref() else {
            return;
        };
        let encoded = self
            .reports
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, _>>()
            .and_then(|mut entries| {
                entries.extend(self.unreadable.iter().cloned());
                serde_json::to_string(&entries)
            });
        let json = match encoded {
            Ok(json) => json,
            Err(e) => {
                warn!(user_id, error = %e, "failed to serialize reports");
                return;
            }
        };
        if let Err(e) = self.kv.set(&user_key(user_id), &json).await {
            warn!(user_id, error = %format!("{:#}", e), "failed to persist reports");
        }
    }
}
