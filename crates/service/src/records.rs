//! Business rules for the employee/customer/service collections on top of
//! [`DocumentStore`]: listing with pagination, the single required field on
//! create, not-found mapping and the dashboard aggregate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::pagination::{paginate, Page, Pagination, SortOrder};
use crate::storage::{Collection, DocumentStore, Fields, Record};

/// How many records per collection the dashboard shows.
pub const DASHBOARD_RECENT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub employees: usize,
    pub customers: usize,
    pub services: usize,
}

/// Dashboard payload. "Recent" is the first records in stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub counts: Counts,
    pub recent_employees: Vec<Record>,
    pub recent_customers: Vec<Record>,
    pub recent_services: Vec<Record>,
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<DocumentStore>,
}

impl RecordService {
    pub fn new(store: Arc<DocumentStore>) -> Self { Self { store } }

    /// One page of a collection. Only employees are re-ordered (by id); the
    /// others keep insertion order and ignore `order`.
    #[instrument(skip(self))]
    pub async fn list(&self, collection: Collection, p: Pagination, order: SortOrder) -> Result<Page<Record>, ServiceError> {
        let mut all = self.store.get_all(collection).await?;
        if collection == Collection::Employees {
            match order {
                SortOrder::Asc => all.sort_by_key(|r| r.id),
                SortOrder::Desc => all.sort_by(|a, b| b.id.cmp(&a.id)),
            }
        }
        Ok(paginate(all, p))
    }

    pub async fn get(&self, collection: Collection, id: u64) -> Result<Record, ServiceError> {
        self.store.get_by_id(collection, id).await?.ok_or_else(ServiceError::not_found)
    }

    #[instrument(skip(self, fields))]
    pub async fn create(&self, collection: Collection, fields: Fields) -> Result<Record, ServiceError> {
        if !fields.get("name").is_some_and(is_present) {
            return Err(ServiceError::Validation("name required".into()));
        }
        let rec = self.store.create(collection, fields).await?;
        info!(%collection, id = ?rec.id, "record_created");
        Ok(rec)
    }

    /// Partial update; an empty field set leaves the record untouched.
    #[instrument(skip(self, fields))]
    pub async fn update(&self, collection: Collection, id: u64, fields: Fields) -> Result<Record, ServiceError> {
        let rec = self.store.update(collection, id, fields).await?.ok_or_else(ServiceError::not_found)?;
        info!(%collection, id, "record_updated");
        Ok(rec)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, collection: Collection, id: u64) -> Result<(), ServiceError> {
        if !self.store.delete(collection, id).await? {
            return Err(ServiceError::not_found());
        }
        info!(%collection, id, "record_deleted");
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<Dashboard, ServiceError> {
        let employees = self.store.get_all(Collection::Employees).await?;
        let customers = self.store.get_all(Collection::Customers).await?;
        let services = self.store.get_all(Collection::Services).await?;
        let counts = Counts { employees: employees.len(), customers: customers.len(), services: services.len() };
        Ok(Dashboard {
            counts,
            recent_employees: head(employees),
            recent_customers: head(customers),
            recent_services: head(services),
        })
    }
}

fn head(mut items: Vec<Record>) -> Vec<Record> {
    items.truncate(DASHBOARD_RECENT);
    items
}

/// Blank strings, `null`, `false` and `0` do not count as a value.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CorruptPolicy;
    use crate::test_support::{fields, temp_data_path};
    use serde_json::json;

    async fn service(tag: &str) -> anyhow::Result<(RecordService, std::path::PathBuf)> {
        let path = temp_data_path(tag);
        let store = DocumentStore::new(&path, CorruptPolicy::Reset).await?;
        Ok((RecordService::new(store), path))
    }

    #[tokio::test]
    async fn create_requires_name() -> anyhow::Result<()> {
        let (svc, path) = service("rec_name").await?;
        for body in [json!({}), json!({"name": ""}), json!({"name": null}), json!({"title": "x"})] {
            let err = svc.create(Collection::Customers, fields(body)).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(ref m) if m == "name required"));
        }
        assert!(svc.store.get_all(Collection::Customers).await?.is_empty());
        let rec = svc.create(Collection::Customers, fields(json!({"name": "Acme", "city": "Oslo"}))).await?;
        assert_eq!(rec.id, Some(1));
        assert_eq!(svc.get(Collection::Customers, 1).await?, rec);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn employees_sorted_by_id_others_in_stored_order() -> anyhow::Result<()> {
        let (svc, path) = service("rec_sort").await?;
        for n in ["a", "b", "c"] {
            svc.create(Collection::Employees, fields(json!({"name": n}))).await?;
            svc.create(Collection::Services, fields(json!({"name": n}))).await?;
        }
        let ids = |p: Page<Record>| p.data.iter().filter_map(|r| r.id).collect::<Vec<_>>();

        let desc = svc.list(Collection::Employees, Pagination::default(), SortOrder::Desc).await?;
        assert_eq!(ids(desc), vec![3, 2, 1]);
        let asc = svc.list(Collection::Employees, Pagination::default(), SortOrder::Asc).await?;
        assert_eq!(ids(asc), vec![1, 2, 3]);
        let services = svc.list(Collection::Services, Pagination::default(), SortOrder::Desc).await?;
        assert_eq!(ids(services), vec![1, 2, 3]);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_through_23_records() -> anyhow::Result<()> {
        let (svc, path) = service("rec_pages").await?;
        for i in 0..23 {
            svc.create(Collection::Customers, fields(json!({"name": format!("c{i}")}))).await?;
        }
        let page = svc
            .list(Collection::Customers, Pagination::from_query(Some("3"), Some("10")), SortOrder::Desc)
            .await?;
        assert_eq!((page.total, page.total_pages, page.data.len()), (23, 3, 3));
        assert_eq!(page.data[0].id, Some(21));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete_map_missing_ids_to_not_found() -> anyhow::Result<()> {
        let (svc, path) = service("rec_missing").await?;
        assert!(matches!(svc.get(Collection::Services, 1).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            svc.update(Collection::Services, 1, Fields::new()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(svc.delete(Collection::Services, 1).await, Err(ServiceError::NotFound(_))));

        svc.create(Collection::Services, fields(json!({"name": "s"}))).await?;
        svc.delete(Collection::Services, 1).await?;
        assert!(matches!(svc.delete(Collection::Services, 1).await, Err(ServiceError::NotFound(_))));
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn dashboard_counts_and_first_five() -> anyhow::Result<()> {
        let (svc, path) = service("rec_dash").await?;
        for i in 0..7 {
            svc.create(Collection::Employees, fields(json!({"name": format!("e{i}")}))).await?;
        }
        svc.create(Collection::Customers, fields(json!({"name": "c"}))).await?;

        let d = svc.dashboard().await?;
        assert_eq!(d.counts, Counts { employees: 7, customers: 1, services: 0 });
        assert_eq!(d.recent_employees.iter().filter_map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(d.recent_customers.len(), 1);
        assert!(d.recent_services.is_empty());

        let v = serde_json::to_value(&d)?;
        assert!(v.get("recentEmployees").is_some());
        assert_eq!(v["counts"]["employees"], 7);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
