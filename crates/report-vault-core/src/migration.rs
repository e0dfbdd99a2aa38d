//! One-time relocation of the legacy unscoped report entry.
//!
//! Before reports were namespaced per user, every report lived under the
//! single key [`LEGACY_KEY`]. The first time a user's store initializes
//! without a user-scoped entry, that legacy entry is copied verbatim into
//! the user's key and then deleted.
//!
//! Any legacy text that is a JSON array is migrated, including arrays with
//! elements that do not decode as reports; those travel verbatim with the
//! rest. Absence of the user-scoped entry is the only trigger, and a successful
//! run always creates that entry before returning, so the routine is a
//! no-op on every later run for the same user.

use tracing::{info, warn};

use crate::models::Report;
use crate::reports::{decode_collection, LoadOutcome, StoredCollection};
use crate::store::{user_key, KeyValueStore, LEGACY_KEY};

/// What [`migrate_legacy`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum MigrationOutcome {
    /// The user already has a scoped entry; nothing was touched.
    AlreadyScoped,
    /// The legacy entry was moved to the user's key.
    Migrated(StoredCollection),
    /// The legacy entry exists but is not a JSON array. It is left in place.
    LegacyUnreadable { error: String },
    /// Neither entry exists.
    NothingToMigrate,
    /// The backend failed; nothing was deleted.
    Unavailable { error: String },
}

impl MigrationOutcome {
    /// The collection the user starts with after this run.
    pub fn into_reports(self) -> Vec<Report> {
        match self {
            MigrationOutcome::Migrated(collection) => collection.reports,
            _ => Vec::new(),
        }
    }
}

fn has_data(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Move the legacy entry into `user_id`'s namespace if the user has none.
///
/// On a legacy parse failure nothing is deleted, so the unreadable text stays
/// available for manual recovery.
pub async fn migrate_legacy(kv: &dyn KeyValueStore, user_id: &str) -> MigrationOutcome {
    let scoped_key = user_key(user_id);

    let scoped = match kv.get(&scoped_key).await {
        Ok(v) => v,
        Err(e) => {
            return MigrationOutcome::Unavailable {
                error: format!("{:#}", e),
            }
        }
    };
    if has_data(&scoped) {
        return MigrationOutcome::AlreadyScoped;
    }

    let legacy = match kv.get(LEGACY_KEY).await {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return MigrationOutcome::NothingToMigrate,
        Err(e) => {
            return MigrationOutcome::Unavailable {
                error: format!("{:#}", e),
            }
        }
    };

    let collection = match decode_collection(&legacy) {
        LoadOutcome::Loaded(collection) => collection,
        LoadOutcome::Corrupt { error } | LoadOutcome::Unavailable { error } => {
            warn!(user_id, %error, "legacy reports are unreadable, leaving them in place");
            return MigrationOutcome::LegacyUnreadable { error };
        }
        LoadOutcome::Missing => return MigrationOutcome::NothingToMigrate,
    };

    if let Err(e) = kv.set(&scoped_key, &legacy).await {
        return MigrationOutcome::Unavailable {
            error: format!("{:#}", e),
        };
    }
    if let Err(e) = kv.delete(LEGACY_KEY).await {
        // The scoped entry exists now, so the routine will not run again.
        warn!(user_id, error = %format!("{:#}", e), "migrated reports but could not remove legacy entry");
    }

    info!(
        user_id,
        count = collection.reports.len(),
        unreadable = collection.unreadable.len(),
        "migrated legacy reports"
    );
    MigrationOutcome::Migrated(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryKvStore;

    const LEGACY_AB: &str = r#"[{"id":"a"},{"id":"b"}]"#;

    #[tokio::test]
    async fn test_migrates_legacy_verbatim() {
        let kv = InMemoryKvStore::with_entries([(LEGACY_KEY, LEGACY_AB)]);

        let outcome = migrate_legacy(&kv, "u1").await;
        let ids: Vec<String> = outcome.into_reports().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert_eq!(kv.get("reports_u1").await.unwrap().as_deref(), Some(LEGACY_AB));
        assert_eq!(kv.get(LEGACY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let kv = InMemoryKvStore::with_entries([
            ("reports_u1", r#"[{"id":"mine"}]"#),
            (LEGACY_KEY, LEGACY_AB),
        ]);

        assert_eq!(migrate_legacy(&kv, "u1").await, MigrationOutcome::AlreadyScoped);
        assert_eq!(migrate_legacy(&kv, "u1").await, MigrationOutcome::AlreadyScoped);

        assert_eq!(
            kv.get("reports_u1").await.unwrap().as_deref(),
            Some(r#"[{"id":"mine"}]"#)
        );
        assert_eq!(kv.get(LEGACY_KEY).await.unwrap().as_deref(), Some(LEGACY_AB));
    }

    #[tokio::test]
    async fn test_run_after_migration_is_noop() {
        let kv = InMemoryKvStore::with_entries([(LEGACY_KEY, LEGACY_AB)]);
        assert!(matches!(
            migrate_legacy(&kv, "u1").await,
            MigrationOutcome::Migrated(_)
        ));
        assert_eq!(migrate_legacy(&kv, "u1").await, MigrationOutcome::AlreadyScoped);
    }

    #[tokio::test]
    async fn test_unreadable_legacy_is_preserved() {
        let kv = InMemoryKvStore::with_entries([(LEGACY_KEY, "<<garbage>>")]);

        let outcome = migrate_legacy(&kv, "u1").await;
        assert!(matches!(outcome, MigrationOutcome::LegacyUnreadable { .. }));
        assert!(outcome.into_reports().is_empty());

        assert_eq!(kv.get(LEGACY_KEY).await.unwrap().as_deref(), Some("<<garbage>>"));
        assert_eq!(kv.get("reports_u1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_nonconforming_legacy_records_still_migrate() {
        let legacy = r#"[{"id":"a","status":"processing"},{"id":7},{"title":"no id"}]"#;
        let kv = InMemoryKvStore::with_entries([(LEGACY_KEY, legacy)]);

        let MigrationOutcome::Migrated(collection) = migrate_legacy(&kv, "u1").await else {
            panic!("legacy array should migrate");
        };
        let ids: Vec<&str> = collection.reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "7"]);
        assert_eq!(collection.unreadable.len(), 1);

        assert_eq!(kv.get("reports_u1").await.unwrap().as_deref(), Some(legacy));
        assert_eq!(kv.get(LEGACY_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_array_legacy_is_preserved() {
        let kv = InMemoryKvStore::with_entries([(LEGACY_KEY, r#"{"id":"a"}"#)]);
        assert!(matches!(
            migrate_legacy(&kv, "u1").await,
            MigrationOutcome::LegacyUnreadable { .. }
        ));
        assert!(kv.get(LEGACY_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_nothing_to_migrate() {
        let kv = InMemoryKvStore::new();
        assert_eq!(migrate_legacy(&kv, "u1").await, MigrationOutcome::NothingToMigrate);
        assert!(kv.keys().is_empty());
    }

    #[tokio::test]
    async fn test_empty_scoped_entry_counts_as_absent() {
        let kv = InMemoryKvStore::with_entries([("reports_u1", ""), (LEGACY_KEY, LEGACY_AB)]);
        assert!(matches!(
            migrate_legacy(&kv, "u1").await,
            MigrationOutcome::Migrated(_)
        ));
    }
}
