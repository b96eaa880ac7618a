use std::collections::HashMap;

use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::template::{Template, TemplateDraft, TemplatePatch};
use crate::error::ApiError;
use crate::filter::Predicate;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, MaybeUser, PathId};
use crate::query::{self, ListQuery};
use crate::state::AppState;
use crate::validation::{FieldRules, Rule, Schema};

const CREATE: Schema = Schema::new(&[
    FieldRules { field: "name", label: "Name", rules: &[Rule::Required, Rule::String, Rule::NotBlank, Rule::MaxLen(255)] },
    FieldRules { field: "config", label: "Config", rules: &[Rule::Required, Rule::Object] },
]);

const UPDATE: Schema = Schema::partial(&[
    FieldRules { field: "name", label: "Name", rules: &[Rule::String, Rule::NotBlank, Rule::MaxLen(255)] },
    FieldRules { field: "config", label: "Config", rules: &[Rule::Object] },
]);

#[derive(Debug, Deserialize)]
struct CreateTemplate {
    name: String,
    config: Value,
}

/// GET /api/templates?scope=global|mine
pub async fn list(
    State(state): State<AppState>,
    caller: MaybeUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<Template>> {
    let query = ListQuery::from_params(params, &state.config.pagination);
    let predicate = match query.text("scope").unwrap_or("global") {
        "global" => Predicate::is_null("user_id"),
        "mine" => Predicate::eq("user_id", caller.0.require()?.id),
        other => {
            return Err(ApiError::InvalidScope(format!(
                "Invalid scope '{}'. Must be 'global' or 'mine'",
                other
            )))
        }
    };
    let result = query::list(state.templates.as_ref(), &[predicate], &query).await?;
    Ok(ApiResponse::page(result))
}

/// POST /api/templates
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Template> {
    let input: CreateTemplate = CREATE.parse(body)?;
    let draft = TemplateDraft { user_id: Some(user.id), name: input.name.trim().to_string(), config: input.config };
    let template = state.templates.insert(draft).await?;
    tracing::info!("User {} created template {}", user.id, template.id);
    Ok(ApiResponse::created(template))
}

/// GET /api/templates/:id
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Template> {
    let template = state.templates.get(id).await?.ok_or_else(ApiError::missing::<Template>)?;
    Ok(ApiResponse::success(template))
}

/// PUT /api/templates/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> ApiResult<Template> {
    let mut patch: TemplatePatch = UPDATE.parse(body)?;
    patch.name = patch.name.map(|n| n.trim().to_string());
    let template = state.templates.update(id, &user, patch).await.map_err(ApiError::mutation::<Template>)?;
    Ok(ApiResponse::success(template))
}

/// DELETE /api/templates/:id
pub async fn delete(State(state): State<AppState>, AuthUser(user): AuthUser, PathId(id): PathId) -> ApiResult<Value> {
    state.templates.delete(id, &user).await.map_err(ApiError::mutation::<Template>)?;
    tracing::info!("User {} deleted template {}", user.id, id);
    Ok(ApiResponse::message("Template deleted successfully"))
}
