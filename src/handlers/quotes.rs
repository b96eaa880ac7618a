use std::collections::HashMap;

use axum::extract::{Query, State};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::quote::{Quote, QuoteDraft, QuotePatch, CATEGORIES, DEFAULT_CATEGORY};
use crate::error::ApiError;
use crate::filter::{Predicate, Window};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, PathId};
use crate::query::{self, ListQuery};
use crate::state::AppState;
use crate::validation::{FieldRules, Rule, Schema};

const CREATE: Schema = Schema::new(&[
    FieldRules {
        field: "text",
        label: "Quote text",
        rules: &[Rule::Required, Rule::String, Rule::MinLen(10), Rule::MaxLen(500)],
    },
    FieldRules {
        field: "author",
        label: "Author",
        rules: &[Rule::Required, Rule::String, Rule::MinLen(2), Rule::MaxLen(100)],
    },
    FieldRules { field: "category", label: "Category", rules: &[Rule::String, Rule::OneOf(CATEGORIES)] },
]);

const UPDATE: Schema = Schema::partial(&[
    FieldRules { field: "text", label: "Quote text", rules: &[Rule::String, Rule::MinLen(10), Rule::MaxLen(500)] },
    FieldRules { field: "author", label: "Author", rules: &[Rule::String, Rule::MinLen(2), Rule::MaxLen(100)] },
    FieldRules { field: "category", label: "Category", rules: &[Rule::String, Rule::OneOf(CATEGORIES)] },
]);

#[derive(Debug, Deserialize)]
struct CreateQuote {
    text: String,
    author: String,
    category: Option<String>,
}

/// category (exact), author (substring), search (text or author), createdBy
fn predicates(query: &ListQuery) -> Result<Vec<Predicate>, ApiError> {
    let mut predicates = Vec::new();
    if let Some(category) = query.text("category") {
        predicates.push(Predicate::eq("category", category));
    }
    if let Some(author) = query.text("author") {
        predicates.push(Predicate::contains_ci(&["author"], author));
    }
    if let Some(search) = query.text("search") {
        predicates.push(Predicate::contains_ci(&["text", "author"], search));
    }
    if let Some(created_by) = query.integer("createdBy")? {
        predicates.push(Predicate::eq("created_by", created_by));
    }
    Ok(predicates)
}

/// GET /api/quotes
pub async fn list(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> ApiResult<Vec<Quote>> {
    let query = ListQuery::from_params(params, &state.config.pagination);
    let predicates = predicates(&query)?;
    let result = query::list(state.quotes.as_ref(), &predicates, &query).await?;
    Ok(ApiResponse::page(result))
}

/// POST /api/quotes
pub async fn create(State(state): State<AppState>, AuthUser(user): AuthUser, JsonBody(body): JsonBody) -> ApiResult<Quote> {
    let input: CreateQuote = CREATE.parse(body)?;
    let draft = QuoteDraft {
        text: input.text.trim().to_string(),
        author: input.author.trim().to_string(),
        category: input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        created_by: Some(user.id),
    };
    let quote = state.quotes.insert(draft).await?;
    tracing::info!("User {} created quote {}", user.id, quote.id);
    Ok(ApiResponse::created(quote))
}

/// GET /api/quotes/random
pub async fn random(State(state): State<AppState>) -> ApiResult<Quote> {
    let total = state.quotes.count(&[]).await?;
    if total == 0 {
        return Err(ApiError::missing::<Quote>());
    }
    let offset = rand::thread_rng().gen_range(0..total);
    let mut picked = state.quotes.select(&[], Window { offset, limit: 1 }).await?;
    // a concurrent delete can empty the window
    picked.pop().map(ApiResponse::success).ok_or_else(ApiError::missing::<Quote>)
}

/// GET /api/quotes/categories
pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::success(state.quotes.distinct("category").await?))
}

/// GET /api/quotes/:id
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Quote> {
    let quote = state.quotes.get(id).await?.ok_or_else(ApiError::missing::<Quote>)?;
    Ok(ApiResponse::success(quote))
}

/// PUT /api/quotes/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Quote> {
    let mut patch: QuotePatch = UPDATE.parse(body)?;
    patch.text = patch.text.map(|t| t.trim().to_string());
    patch.author = patch.author.map(|a| a.trim().to_string());
    let quote = state.quotes.update(id, &user, patch).await.map_err(ApiError::mutation::<Quote>)?;
    Ok(ApiResponse::success(quote))
}

/// DELETE /api/quotes/:id
pub async fn delete(State(state): State<AppState>, AuthUser(user): AuthUser, PathId(id): PathId) -> ApiResult<Value> {
    state.quotes.delete(id, &user).await.map_err(ApiError::mutation::<Quote>)?;
    tracing::info!("User {} deleted quote {}", user.id, id);
    Ok(ApiResponse::message("Quote deleted successfully"))
}

/// POST /api/quotes/:id/like
pub async fn like(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Quote> {
    bump(&state, id, "likes").await
}

/// POST /api/quotes/:id/share
pub async fn share(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Quote> {
    bump(&state, id, "shares").await
}

async fn bump(state: &AppState, id: i64, counter: &'static str) -> ApiResult<Quote> {
    let quote = state.quotes.increment(id, counter).await?.ok_or_else(ApiError::missing::<Quote>)?;
    Ok(ApiResponse::success(quote))
}
