use async_trait::async_trait;
use thiserror::Error;

use crate::auth::{Denial, Identity};
use crate::filter::{FilterError, Predicate, Window};

use super::resource::Resource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported counter column: {0}")]
    UnsupportedColumn(String),

    #[error("Query error: {0}")]
    Query(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Outcome of a guarded update or delete
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("record not found")]
    NotFound,

    #[error("mutation denied: {0:?}")]
    Denied(Denial),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for MutationError {
    fn from(err: sqlx::Error) -> Self {
        MutationError::Store(err.into())
    }
}

/// One bounded page plus the total row count for the same predicate
#[derive(Debug, Clone)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total: i64,
}

/// Result of [`Store::upsert`]
#[derive(Debug, Clone)]
pub struct Upserted<R> {
    pub row: R,
    /// `true` when no row held the key and `row` was inserted
    pub created: bool,
}

/// Backing store for one collection.
///
/// Implementations order `select` results newest-first with the id as a
/// tie-break. `update` and `delete` run the ownership check and the write as
/// one atomic step, so ownership cannot change in between.
#[async_trait]
pub trait Store<R: Resource>: Send + Sync {
    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;

    async fn count(&self, predicates: &[Predicate]) -> Result<i64, StoreError>;

    async fn select(&self, predicates: &[Predicate], window: Window) -> Result<Vec<R>, StoreError>;

    /// Count and select with one predicate list.
    ///
    /// The default runs both queries concurrently; backends that can read a
    /// consistent snapshot override it.
    async fn page(&self, predicates: &[Predicate], window: Window) -> Result<Page<R>, StoreError> {
        let (total, items) = futures::try_join!(self.count(predicates), self.select(predicates, window))?;
        Ok(Page { items, total })
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError>;

    async fn insert(&self, draft: R::Draft) -> Result<R, StoreError>;

    async fn update(&self, id: i64, actor: &Identity, patch: R::Patch) -> Result<R, MutationError>;

    async fn delete(&self, id: i64, actor: &Identity) -> Result<R, MutationError>;

    /// Insert `draft`, or apply `patch` to the row whose `key_column` matches
    /// the draft's, as one atomic step. `key_column` must be unique per row.
    async fn upsert(&self, key_column: &'static str, draft: R::Draft, patch: R::Patch) -> Result<Upserted<R>, StoreError>;

    /// Atomically add one to a counter column. `Ok(None)` when the id does not resolve.
    async fn increment(&self, id: i64, column: &'static str) -> Result<Option<R>, StoreError>;

    /// Distinct non-null string values of a column, sorted
    async fn distinct(&self, column: &'static str) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
