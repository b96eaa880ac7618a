use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row};

use crate::auth::{authorize_mutation, Identity};
use crate::filter::filter_where::quote_column;
use crate::filter::{Filter, Predicate, Window, NEWEST_FIRST};

use super::resource::{Resource, SqlParam};
use super::store::{MutationError, Page, Store, StoreError, Upserted};

/// PostgreSQL-backed store for one table
pub struct PgStore<R> {
    pool: PgPool,
    _phantom: PhantomData<fn() -> R>,
}

impl<R> PgStore<R>
where
    R: Resource + for<'r> FromRow<'r, PgRow>,
{
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _phantom: PhantomData }
    }

    fn filter(predicates: &[Predicate]) -> Result<Filter, StoreError> {
        let mut filter = Filter::new(R::TABLE)?;
        filter.where_all(predicates).order(NEWEST_FIRST);
        Ok(filter)
    }

    fn table() -> Result<String, StoreError> {
        Ok(quote_column(R::TABLE)?)
    }

    async fn lock_row(tx: &mut sqlx::Transaction<'_, Postgres>, id: i64) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE \"id\" = $1 FOR UPDATE", Self::table()?);
        let row = sqlx::query_as::<_, R>(&sql).bind(id).fetch_optional(&mut **tx).await?;
        Ok(row)
    }
}

#[async_trait]
impl<R> Store<R> for PgStore<R>
where
    R: Resource + for<'r> FromRow<'r, PgRow>,
{
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<i64, StoreError> {
        let sql_result = Self::filter(predicates)?.to_count_sql()?;
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    async fn select(&self, predicates: &[Predicate], window: Window) -> Result<Vec<R>, StoreError> {
        let mut filter = Self::filter(predicates)?;
        filter.window(window)?;
        let sql_result = filter.to_sql()?;
        let mut q = sqlx::query_as::<_, R>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Count and page inside one REPEATABLE READ snapshot
    async fn page(&self, predicates: &[Predicate], window: Window) -> Result<Page<R>, StoreError> {
        let mut filter = Self::filter(predicates)?;
        let count_sql = filter.to_count_sql()?;
        filter.window(window)?;
        let select_sql = filter.to_sql()?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut count_q = sqlx::query(&count_sql.query);
        for p in count_sql.params.iter() {
            count_q = bind_param_query(count_q, p);
        }
        let total: i64 = count_q.fetch_one(&mut *tx).await?.try_get("count")?;

        let mut select_q = sqlx::query_as::<_, R>(&select_sql.query);
        for p in select_sql.params.iter() {
            select_q = bind_param_query_as(select_q, p);
        }
        let items = select_q.fetch_all(&mut *tx).await?;

        tx.commit().await?;
        Ok(Page { items, total })
    }

    async fn get(&self, id: i64) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT * FROM {} WHERE \"id\" = $1", Self::table()?);
        Ok(sqlx::query_as::<_, R>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert(&self, draft: R::Draft) -> Result<R, StoreError> {
        let params = R::insert_params(&draft);
        let mut columns = Vec::with_capacity(params.len());
        let mut placeholders = Vec::with_capacity(params.len());
        for (index, (column, _)) in params.iter().enumerate() {
            columns.push(quote_column(column)?);
            placeholders.push(format!("${}", index + 1));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            Self::table()?,
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut q = sqlx::query_as::<_, R>(&sql);
        for (_, param) in params {
            q = bind_sql_param(q, param);
        }
        let row = q.fetch_one(&self.pool).await?;
        tracing::debug!("Inserted {} {}", R::KIND, row.id());
        Ok(row)
    }

    async fn update(&self, id: i64, actor: &Identity, patch: R::Patch) -> Result<R, MutationError> {
        let mut tx = self.pool.begin().await?;
        let existing = Self::lock_row(&mut tx, id).await?.ok_or(MutationError::NotFound)?;
        authorize_mutation(existing.owner(), actor).map_err(MutationError::Denied)?;

        let params = R::update_params(&patch);
        let mut assignments = Vec::with_capacity(params.len() + 1);
        for (index, (column, _)) in params.iter().enumerate() {
            assignments.push(format!("{} = ${}", quote_column(column).map_err(StoreError::from)?, index + 1));
        }
        if R::HAS_UPDATED_AT {
            assignments.push("\"updated_at\" = NOW()".to_string());
        }
        if assignments.is_empty() {
            tx.commit().await?;
            return Ok(existing);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE \"id\" = ${} RETURNING *",
            Self::table()?,
            assignments.join(", "),
            params.len() + 1
        );
        let mut q = sqlx::query_as::<_, R>(&sql);
        for (_, param) in params {
            q = bind_sql_param(q, param);
        }
        let updated = q.bind(id).fetch_one(&mut *tx).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64, actor: &Identity) -> Result<R, MutationError> {
        let mut tx = self.pool.begin().await?;
        let existing = Self::lock_row(&mut tx, id).await?.ok_or(MutationError::NotFound)?;
        authorize_mutation(existing.owner(), actor).map_err(MutationError::Denied)?;

        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", Self::table()?);
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(existing)
    }

    /// `INSERT ... ON CONFLICT (key) DO UPDATE`; `xmax = 0` only on freshly inserted rows
    async fn upsert(&self, key_column: &'static str, draft: R::Draft, patch: R::Patch) -> Result<Upserted<R>, StoreError> {
        let key = quote_column(key_column)?;
        let params = R::insert_params(&draft);
        let mut columns = Vec::with_capacity(params.len());
        let mut placeholders = Vec::with_capacity(params.len());
        for (index, (column, _)) in params.iter().enumerate() {
            columns.push(quote_column(column)?);
            placeholders.push(format!("${}", index + 1));
        }

        let mut assignments = Vec::new();
        for (column, _) in R::update_params(&patch) {
            let quoted = quote_column(column)?;
            assignments.push(format!("{col} = EXCLUDED.{col}", col = quoted));
        }
        if R::HAS_UPDATED_AT {
            assignments.push("\"updated_at\" = NOW()".to_string());
        }
        if assignments.is_empty() {
            assignments.push(format!("{col} = EXCLUDED.{col}", col = key));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {} RETURNING *, (xmax = 0) AS inserted",
            Self::table()?,
            columns.join(", "),
            placeholders.join(", "),
            key,
            assignments.join(", ")
        );

        let mut q = sqlx::query(&sql);
        for (_, param) in params {
            q = match param {
                SqlParam::Int(v) => q.bind(v),
                SqlParam::Text(v) => q.bind(v),
                SqlParam::Json(v) => q.bind(v),
            };
        }
        let row = q.fetch_one(&self.pool).await?;
        let created: bool = row.try_get("inserted")?;
        let row = R::from_row(&row)?;
        tracing::debug!("Upserted {} {} (created: {})", R::KIND, row.id(), created);
        Ok(Upserted { row, created })
    }

    async fn increment(&self, id: i64, column: &'static str) -> Result<Option<R>, StoreError> {
        if !R::COUNTERS.contains(&column) {
            return Err(StoreError::UnsupportedColumn(column.to_string()));
        }
        let quoted = quote_column(column)?;
        let sql = format!(
            "UPDATE {} SET {col} = {col} + 1 WHERE \"id\" = $1 RETURNING *",
            Self::table()?,
            col = quoted
        );
        Ok(sqlx::query_as::<_, R>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn distinct(&self, column: &'static str) -> Result<Vec<String>, StoreError> {
        let quoted = quote_column(column)?;
        let sql = format!(
            "SELECT DISTINCT {col} AS value FROM {} WHERE {col} IS NOT NULL ORDER BY 1",
            Self::table()?,
            col = quoted
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            values.push(row.try_get::<String, _>("value")?);
        }
        Ok(values)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn bind_sql_param<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    param: SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match param {
        SqlParam::Int(v) => q.bind(v),
        SqlParam::Text(v) => q.bind(v),
        SqlParam::Json(v) => q.bind(v),
    }
}

// Predicates only carry integers and text
fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        Value::String(s) => q.bind(s.clone()),
        other => q.bind(other.as_i64()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &Value,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::String(s) => q.bind(s.clone()),
        other => q.bind(other.as_i64()),
    }
}
