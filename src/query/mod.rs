//! List endpoint plumbing: query-string normalisation and the paged read.

pub mod pagination;
pub mod params;

pub use pagination::{list, PageResult, Pagination};
pub use params::{parse_id, ListQuery};
