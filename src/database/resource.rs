use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A typed column value for INSERT/UPDATE statements.
///
/// Unlike filter parameters, write parameters keep their SQL type even when
/// the value is NULL, so nullable BIGINT/JSONB columns bind correctly.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i64>),
    Text(Option<String>),
    Json(Value),
}

/// A record type held by a [`Store`](super::Store).
///
/// Records carry a server-assigned `i64` id and a creation timestamp; both
/// drive the newest-first ordering every list endpoint uses.
pub trait Resource: Clone + Serialize + Send + Sync + Unpin + 'static {
    /// Singular name used in error codes (`quote` → `QUOTE_NOT_FOUND`)
    const KIND: &'static str;
    const TABLE: &'static str;
    /// Whether the table has an `updated_at` column maintained on update
    const HAS_UPDATED_AT: bool = true;
    /// Integer columns that may be bumped with [`Store::increment`](super::Store::increment)
    const COUNTERS: &'static [&'static str] = &[];

    type Draft: Send + Sync + 'static;
    type Patch: Send + Sync + 'static;

    fn id(&self) -> i64;
    fn created_at(&self) -> DateTime<Utc>;
    /// Owning user, `None` for shared records
    fn owner(&self) -> Option<i64>;
    /// Read a column by its SQL name, for in-memory predicate evaluation
    fn column(&self, name: &str) -> Option<Value>;

    fn from_draft(id: i64, now: DateTime<Utc>, draft: Self::Draft) -> Self;
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);
    fn increment(&mut self, _column: &str) -> bool {
        false
    }

    fn insert_params(draft: &Self::Draft) -> Vec<(&'static str, SqlParam)>;
    fn update_params(patch: &Self::Patch) -> Vec<(&'static str, SqlParam)>;
}
