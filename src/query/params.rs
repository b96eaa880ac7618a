use std::collections::HashMap;
use std::num::IntErrorKind;

use crate::config::PaginationConfig;
use crate::error::ApiError;
use crate::filter::Window;
use crate::validation::FieldError;

/// Normalised `page`/`limit`/`offset` plus the raw query string for filter lookup.
///
/// `offset` is `(page - 1) * limit` unless the request gave an explicit
/// `offset` without a `page`; then the window starts exactly there and `page`
/// is the page holding its first row.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    params: HashMap<String, String>,
}

impl ListQuery {
    /// Clamp paging parameters. Never fails: bad values fall back to defaults
    /// or the nearest bound.
    pub fn from_params(params: HashMap<String, String>, config: &PaginationConfig) -> Self {
        let max_limit = config.max_limit.max(1);
        let limit = params
            .get("limit")
            .and_then(|v| parse_int(v))
            .unwrap_or(config.default_limit)
            .clamp(1, max_limit);

        let explicit_offset = params.get("offset").and_then(|v| parse_int(v));
        let (page, offset) = match (params.get("page").and_then(|v| parse_int(v)), explicit_offset) {
            (Some(page), _) => {
                let page = page.max(1);
                (page, (page - 1).saturating_mul(limit))
            }
            (None, Some(offset)) => {
                let offset = offset.max(0);
                (offset / limit + 1, offset)
            }
            (None, None) => (1, 0),
        };

        Self { page, limit, offset, params }
    }

    pub fn window(&self) -> Window {
        Window { offset: self.offset, limit: self.limit }
    }

    /// A recognised text filter. Empty values count as absent.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// A recognised integer filter. Present but non-numeric is a client error.
    pub fn integer(&self, key: &str) -> Result<Option<i64>, ApiError> {
        match self.text(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|_| {
                ApiError::validation_error(vec![FieldError::new(key, format!("{} must be an integer", key))])
            }),
        }
    }
}

/// Integer parse that saturates on overflow instead of failing
fn parse_int(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// Parse a numeric path identifier before any store access
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation_error(vec![FieldError::new("id", "id must be an integer")]))
}
