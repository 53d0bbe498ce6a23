use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use super::document::{Collection, Document, Fields, NewUser, Record, User, UserEntry};
use crate::errors::ServiceError;

/// How to treat a data file that exists but does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptPolicy {
    /// Warn and continue with an empty document. The next write replaces the file.
    #[default]
    Reset,
    /// Surface [`ServiceError::Storage`] to the caller.
    Fail,
}

/// JSON file-backed datastore holding every collection in one document.
///
/// Nothing is cached between calls: each read parses the file again and each
/// write re-reads, mutates and rewrites the whole document. Within the process
/// read-modify-write cycles are serialized by `lock`, so concurrent creates
/// cannot hand out the same id.
pub struct DocumentStore {
    file_path: PathBuf,
    policy: CorruptPolicy,
    lock: RwLock<()>,
}

impl DocumentStore {
    /// Initialize the store from a path. Creates the file with empty collections if missing.
    pub async fn new<P: Into<PathBuf>>(path: P, policy: CorruptPolicy) -> Result<Arc<Self>, ServiceError> {
        let store = Self { file_path: path.into(), policy, lock: RwLock::new(()) };
        store.ensure_file().await?;
        Ok(Arc::new(store))
    }

    async fn ensure_file(&self) -> Result<(), ServiceError> {
        if fs::try_exists(&self.file_path).await.map_err(ServiceError::storage)? {
            return Ok(());
        }
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
            }
        }
        debug!(path = %self.file_path.display(), "seeding empty data file");
        self.write(&Document::default()).await
    }

    /// Only a file that is not a JSON document of the expected layout counts
    /// as corrupt. Odd individual entries are kept; see [`Record`] and [`UserEntry`].
    async fn read(&self) -> Result<Document, ServiceError> {
        self.ensure_file().await?;
        let bytes = fs::read(&self.file_path).await.map_err(ServiceError::storage)?;
        match serde_json::from_slice::<Document>(&bytes) {
            Ok(doc) => Ok(doc),
            Err(e) => match self.policy {
                CorruptPolicy::Reset => {
                    warn!(path = %self.file_path.display(), error = %e, "data file unparsable; using empty document");
                    Ok(Document::default())
                }
                CorruptPolicy::Fail => Err(ServiceError::Storage(format!(
                    "{} is not a valid data file: {e}",
                    self.file_path.display()
                ))),
            },
        }
    }

    async fn write(&self, doc: &Document) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc).map_err(ServiceError::storage)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
        fs::rename(&tmp, &self.file_path).await.map_err(ServiceError::storage)?;
        Ok(())
    }

    /// Read the whole document under a shared lock.
    pub async fn snapshot(&self) -> Result<Document, ServiceError> {
        let _guard = self.lock.read().await;
        self.read().await
    }

    /// Apply a mutation to a freshly read document and persist it.
    ///
    /// `f` returns `None` when it changed nothing; the file is then left alone.
    async fn modify<T, F>(&self, f: F) -> Result<Option<T>, ServiceError>
    where
        F: FnOnce(&mut Document) -> Option<T>,
    {
        let _guard = self.lock.write().await;
        let mut doc = self.read().await?;
        let out = f(&mut doc);
        if out.is_some() {
            self.write(&doc).await?;
        }
        Ok(out)
    }

    /// All records of a collection in stored order.
    pub async fn get_all(&self, collection: Collection) -> Result<Vec<Record>, ServiceError> {
        let doc = self.snapshot().await?;
        Ok(doc.collection(collection).clone())
    }

    pub async fn get_by_id(&self, collection: Collection, id: u64) -> Result<Option<Record>, ServiceError> {
        let doc = self.snapshot().await?;
        Ok(doc.collection(collection).iter().find(|r| r.id == Some(id)).cloned())
    }

    /// Append a record with the next free id. A client-supplied `id` is dropped.
    pub async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, ServiceError> {
        let created = self
            .modify(|doc| {
                let rec = Record::new(doc.next_record_id(collection), fields);
                doc.collection_mut(collection).push(rec.clone());
                Some(rec)
            })
            .await?
            .ok_or_else(|| ServiceError::Storage("create produced no record".into()))?;
        debug!(%collection, id = ?created.id, "record created");
        Ok(created)
    }

    /// Shallow-merge `fields` into the record; `None` when the id is unknown.
    pub async fn update(&self, collection: Collection, id: u64, fields: Fields) -> Result<Option<Record>, ServiceError> {
        let updated = self
            .modify(|doc| {
                let rec = doc.collection_mut(collection).iter_mut().find(|r| r.id == Some(id))?;
                rec.merge(fields);
                Some(rec.clone())
            })
            .await?;
        debug!(%collection, id, found = updated.is_some(), "record update");
        Ok(updated)
    }

    /// Remove the record; returns whether it existed.
    pub async fn delete(&self, collection: Collection, id: u64) -> Result<bool, ServiceError> {
        let removed = self
            .modify(|doc| {
                let items = doc.collection_mut(collection);
                let idx = items.iter().position(|r| r.id == Some(id))?;
                Some(items.remove(idx))
            })
            .await?;
        debug!(%collection, id, removed = removed.is_some(), "record delete");
        Ok(removed.is_some())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let doc = self.snapshot().await?;
        let found = doc.users().find(|u| u.username == username).cloned();
        Ok(found)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let doc = self.snapshot().await?;
        let found = doc.users().find(|u| u.email == email).cloned();
        Ok(found)
    }

    /// Append a user. Uniqueness of username/email is the caller's job.
    pub async fn create_user(&self, input: NewUser) -> Result<User, ServiceError> {
        self.modify(|doc| {
            let user = User {
                id: doc.next_user_id(),
                username: input.username,
                email: input.email,
                password_hash: input.password_hash,
                created_at: Utc::now().to_rfc3339(),
                extra: Fields::new(),
            };
            doc.users.push(UserEntry::Valid(user.clone()));
            Some(user)
        })
        .await?
        .ok_or_else(|| ServiceError::Storage("create_user produced no user".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fields, temp_data_path};
    use serde_json::json;

    #[tokio::test]
    async fn seeds_file_with_four_empty_collections() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("seed");
        let _store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(raw, json!({"employees": [], "customers": [], "services": [], "users": []}));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn crud_round_trip_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("crud");
        let store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;

        let a = store.create(Collection::Customers, fields(json!({"name": "Acme", "tier": "gold"}))).await?;
        let b = store.create(Collection::Customers, fields(json!({"name": "Globex"}))).await?;
        assert_eq!((a.id, b.id), (Some(1), Some(2)));

        let found = store.get_by_id(Collection::Customers, 1).await?.expect("created record");
        assert_eq!(found, a);
        assert_eq!(found.fields.get("tier"), Some(&json!("gold")));

        // other collections are independent
        assert!(store.get_all(Collection::Employees).await?.is_empty());
        let e = store.create(Collection::Employees, fields(json!({"name": "X"}))).await?;
        assert_eq!(e.id, Some(1));

        // reload from disk
        let reloaded = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        let all = reloaded.get_all(Collection::Customers).await?;
        assert_eq!(all.iter().filter_map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn create_ignores_client_id() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("client_id");
        let store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        let rec = store.create(Collection::Services, fields(json!({"id": 40, "name": "Audit"}))).await?;
        assert_eq!(rec.id, Some(1));
        assert_eq!(store.get_by_id(Collection::Services, 40).await?, None);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_and_empty_update_is_noop() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("update");
        let store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        let rec = store.create(Collection::Employees, fields(json!({"name": "Ada", "dept": "R&D"}))).await?;

        let same = store.update(Collection::Employees, 1, Fields::new()).await?;
        assert_eq!(same.as_ref(), Some(&rec));

        let merged = store
            .update(Collection::Employees, 1, fields(json!({"id": 77, "dept": "Ops", "title": "Lead"})))
            .await?
            .expect("existing record");
        assert_eq!(merged.id, rec.id);
        assert_eq!(merged.name(), Some("Ada"));
        assert_eq!(merged.fields.get("dept"), Some(&json!("Ops")));
        assert_eq!(merged.fields.get("title"), Some(&json!("Lead")));

        assert_eq!(store.update(Collection::Employees, 999, fields(json!({"name": "n"}))).await?, None);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_exact_and_ids_keep_climbing() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("delete");
        let store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        for n in ["a", "b", "c"] {
            store.create(Collection::Employees, fields(json!({"name": n}))).await?;
        }
        assert!(store.delete(Collection::Employees, 2).await?);
        assert!(!store.delete(Collection::Employees, 2).await?);
        let ids: Vec<u64> = store.get_all(Collection::Employees).await?.iter().filter_map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let next = store.create(Collection::Employees, fields(json!({"name": "d"}))).await?;
        assert_eq!(next.id, Some(4));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn users_lookup_by_username_and_email() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("users");
        let store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        let u = store
            .create_user(NewUser { username: "ann".into(), email: "ann@example.com".into(), password_hash: "h".into() })
            .await?;
        assert_eq!(u.id, 1);
        assert_eq!(store.get_user_by_username("ann").await?.map(|u| u.id), Some(1));
        assert_eq!(store.get_user_by_email("ann@example.com").await?.map(|u| u.id), Some(1));
        assert!(store.get_user_by_username("Ann").await?.is_none());

        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(raw["users"][0]["passwordHash"], "h");
        assert!(raw["users"][0]["created_at"].is_string());
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_resets_or_fails_by_policy() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("corrupt");
        tokio::fs::write(&tmp, b"{not json").await?;

        let lenient = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        assert!(lenient.get_all(Collection::Employees).await?.is_empty());

        let strict = DocumentStore::new(&tmp, CorruptPolicy::Fail).await?;
        assert!(matches!(strict.get_all(Collection::Employees).await, Err(ServiceError::Storage(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn odd_entries_do_not_wipe_the_file() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("odd_entries");
        let seeded = json!({
            "employees": [{"id": 1, "name": "Ada"}, {"id": "abc", "name": "legacy"}, {"id": -1, "name": "neg"}],
            "customers": [{"id": 1, "name": "Acme"}],
            "services": [],
            "users": [{"id": 1, "username": "old", "email": "old@b.c", "passwordHash": "h", "created_at": 1700000000}]
        });
        tokio::fs::write(&tmp, serde_json::to_vec(&seeded)?).await?;
        let store = DocumentStore::new(&tmp, CorruptPolicy::Fail).await?;

        assert_eq!(store.get_all(Collection::Customers).await?.len(), 1);
        assert_eq!(store.get_all(Collection::Employees).await?.len(), 3);
        // only numeric ids are addressable
        assert!(store.get_by_id(Collection::Employees, 1).await?.is_some());
        assert!(store.get_by_id(Collection::Employees, 0).await?.is_none());

        let created = store.create(Collection::Services, fields(json!({"name": "new"}))).await?;
        assert_eq!(created.id, Some(1));
        let next = store.create(Collection::Employees, fields(json!({"name": "Bob"}))).await?;
        assert_eq!(next.id, Some(2));

        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(raw["customers"], seeded["customers"]);
        assert_eq!(raw["users"], seeded["users"]);
        assert_eq!(raw["employees"][1], json!({"id": "abc", "name": "legacy"}));
        assert_eq!(raw["employees"][2], json!({"id": -1, "name": "neg"}));
        assert_eq!(raw["employees"].as_array().map(Vec::len), Some(4));
        assert_eq!(raw["services"], json!([{"id": 1, "name": "new"}]));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() -> Result<(), anyhow::Error> {
        let tmp = temp_data_path("concurrent");
        let store = DocumentStore::new(&tmp, CorruptPolicy::Reset).await?;
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create(Collection::Services, fields(json!({"name": format!("s{i}")}))).await
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.extend(h.await??.id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<u64>>());
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
