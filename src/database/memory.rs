use std::collections::{BTreeMap, BTreeSet};
use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::auth::{authorize_mutation, Identity};
use crate::filter::{Predicate, Window};

use super::resource::Resource;
use super::store::{MutationError, Page, Store, StoreError, Upserted};

/// In-process store. One `RwLock` guards the whole table, which makes every
/// operation (including check-then-write mutations) atomic.
pub struct MemoryStore<R> {
    table: RwLock<MemoryTable<R>>,
}

struct MemoryTable<R> {
    rows: BTreeMap<i64, R>,
    // Ids are never handed out twice, even after deletes
    next_id: i64,
}

impl<R: Resource> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(MemoryTable { rows: BTreeMap::new(), next_id: 1 }),
        }
    }
}

impl<R: Resource> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> MemoryTable<R> {
    fn matching(&self, predicates: &[Predicate]) -> Vec<&R> {
        let mut rows: Vec<&R> = self
            .rows
            .values()
            .filter(|row| predicates.iter().all(|p| p.matches(|column| row.column(column))))
            .collect();
        rows.sort_by_key(|row| Reverse((row.created_at(), row.id())));
        rows
    }
}

fn slice<R: Clone>(rows: &[&R], window: Window) -> Vec<R> {
    rows.iter()
        .skip(window.offset.max(0) as usize)
        .take(window.limit.max(0) as usize)
        .map(|row| (*row).clone())
        .collect()
}

#[async_trait]
impl<R: Resource> Store<R> for MemoryStore<R> {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<i64, StoreError> {
        let table = self.table.read().await;
        Ok(table.matching(predicates).len() as i64)
    }

    async fn select(&self, predicates: &[Predicate], window: Window) -> Result<Vec<R>, StoreError> {
        let table = self.table.read().await;
        Ok(slice(&table.matching(predicates), window))
    }

    async fn page(&self, predicates: &[Predicate], window: Window) -> Result<Page<R>, StoreError> {
        let table = self.table.read().await;
        let rows = table.matching(predicates);
        Ok(Page { total: rows.len() as i64, items: slice(&rows, window) })
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, draft: R::Draft) -> Result<R, StoreError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;
        let row = R::from_draft(id, Utc::now(), draft);
        table.rows.insert(id, row.clone());
        tracing::debug!("Inserted {} {}", R::KIND, id);
        Ok(row)
    }

    async fn update(&self, id: i64, actor: &Identity, patch: R::Patch) -> Result<R, MutationError> {
        let mut table = self.table.write().await;
        let row = table.rows.get_mut(&id).ok_or(MutationError::NotFound)?;
        authorize_mutation(row.owner(), actor).map_err(MutationError::Denied)?;
        row.apply(patch, Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: i64, actor: &Identity) -> Result<R, MutationError> {
        let mut table = self.table.write().await;
        let owner = table.rows.get(&id).ok_or(MutationError::NotFound)?.owner();
        authorize_mutation(owner, actor).map_err(MutationError::Denied)?;
        table.rows.remove(&id).ok_or(MutationError::NotFound)
    }

    async fn upsert(&self, key_column: &'static str, draft: R::Draft, patch: R::Patch) -> Result<Upserted<R>, StoreError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let candidate = R::from_draft(table.next_id, now, draft);
        let key = candidate.column(key_column).filter(|v| !v.is_null());

        let existing = key
            .as_ref()
            .and_then(|key| table.rows.values().find(|row| row.column(key_column).as_ref() == Some(key)))
            .map(|row| row.id());
        if let Some(row) = existing.and_then(|id| table.rows.get_mut(&id)) {
            row.apply(patch, now);
            return Ok(Upserted { row: row.clone(), created: false });
        }

        table.next_id += 1;
        table.rows.insert(candidate.id(), candidate.clone());
        tracing::debug!("Inserted {} {}", R::KIND, candidate.id());
        Ok(Upserted { row: candidate, created: true })
    }

    async fn increment(&self, id: i64, column: &'static str) -> Result<Option<R>, StoreError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if !row.increment(column) {
            return Err(StoreError::UnsupportedColumn(column.to_string()));
        }
        Ok(Some(row.clone()))
    }

    async fn distinct(&self, column: &'static str) -> Result<Vec<String>, StoreError> {
        let table = self.table.read().await;
        let values: BTreeSet<String> = table
            .rows
            .values()
            .filter_map(|row| match row.column(column) {
                Some(Value::String(s)) => Some(s),
                _ => None,
            })
            .collect();
        Ok(values.into_iter().collect())
    }
}
