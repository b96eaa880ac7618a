use serde::Serialize;

use crate::database::{Resource, Store, StoreError};
use crate::filter::Predicate;

use super::params::ListQuery;

/// Page metadata, derived only from the window (`page`, `limit`, `offset`)
/// and `total`.
///
/// For page-aligned windows `hasNext == page < totalPages` and
/// `hasPrev == page > 1`; an unaligned explicit offset reports whether rows
/// exist after or before the window itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Metadata for page `page`
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = limit.max(1);
        Self::with_offset(page, limit, (page.max(1) - 1).saturating_mul(limit), total)
    }

    pub fn with_offset(page: i64, limit: i64, offset: i64, total: i64) -> Self {
        let limit = limit.max(1);
        let offset = offset.max(0);
        let total = total.max(0);
        let total_pages = (total + limit - 1) / limit;
        Self {
            page,
            limit,
            offset,
            total,
            total_pages,
            has_next: offset.saturating_add(limit) < total,
            has_prev: offset > 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageResult<R> {
    pub items: Vec<R>,
    pub pagination: Pagination,
}

/// Run one paged read: count and window share the predicate list.
pub async fn list<R, S>(store: &S, predicates: &[Predicate], query: &ListQuery) -> Result<PageResult<R>, StoreError>
where
    R: Resource,
    S: Store<R> + ?Sized,
{
    let page = store.page(predicates, query.window()).await?;
    tracing::debug!(
        "Listed {} {} of {} (offset {}, limit {})",
        page.items.len(),
        R::TABLE,
        page.total,
        query.offset,
        query.limit
    );
    Ok(PageResult {
        items: page.items,
        pagination: Pagination::with_offset(query.page, query.limit, query.offset, page.total),
    })
}
