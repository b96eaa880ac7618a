use std::collections::HashMap;

use axum::extract::{Query, State};
use serde_json::Value;

use crate::database::models::Asset;
use crate::error::ApiError;
use crate::filter::Predicate;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PathId};
use crate::query::{self, ListQuery};
use crate::state::AppState;

/// GET /api/assets
pub async fn list(State(state): State<AppState>, Query(params): Query<HashMap<String, String>>) -> ApiResult<Vec<Asset>> {
    let query = ListQuery::from_params(params, &state.config.pagination);
    let mut predicates = Vec::new();
    if let Some(user_id) = query.integer("userId")? {
        predicates.push(Predicate::eq("user_id", user_id));
    }
    if let Some(template_id) = query.integer("templateId")? {
        predicates.push(Predicate::eq("template_id", template_id));
    }
    let result = query::list(state.assets.as_ref(), &predicates, &query).await?;
    Ok(ApiResponse::page(result))
}

/// GET /api/assets/:id
pub async fn get(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Asset> {
    let asset = state.assets.get(id).await?.ok_or_else(ApiError::missing::<Asset>)?;
    Ok(ApiResponse::success(asset))
}

/// DELETE /api/assets/:id
///
/// Removes the record, then the rendered file. A file that cannot be removed
/// is logged and left behind; the delete still succeeds.
pub async fn delete(State(state): State<AppState>, AuthUser(user): AuthUser, PathId(id): PathId) -> ApiResult<Value> {
    let asset = state.assets.delete(id, &user).await.map_err(ApiError::mutation::<Asset>)?;

    match state.storage.remove_by_url(&asset.url).await {
        Ok(true) => tracing::debug!("Removed render file for asset {}", asset.id),
        Ok(false) => tracing::debug!("No local render file for asset {}", asset.id),
        Err(e) => tracing::warn!("Failed to remove render file for asset {}: {}", asset.id, e),
    }

    Ok(ApiResponse::message("Asset deleted successfully"))
}
