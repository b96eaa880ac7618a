use std::collections::HashMap;

use axum::extract::{Query, State};

use crate::auth::Identity;
use crate::database::models::brand_kit::{BrandKit, BrandKitDraft, BrandKitFields};
use crate::database::Store;
use crate::error::ApiError;
use crate::filter::{Predicate, Window};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::state::AppState;
use crate::validation::{FieldError, FieldRules, Rule, Schema};

const COLOR: &[Rule] = &[Rule::Required, Rule::String, Rule::NotBlank, Rule::MaxLen(255)];

const UPSERT: Schema = Schema::new(&[
    FieldRules { field: "primaryColor", label: "Primary color", rules: COLOR },
    FieldRules { field: "secondaryColor", label: "Secondary color", rules: COLOR },
    FieldRules { field: "accentColor", label: "Accent color", rules: COLOR },
    FieldRules { field: "fontFamily", label: "Font family", rules: COLOR },
    FieldRules { field: "logoUrl", label: "Logo URL", rules: &[Rule::String, Rule::MaxLen(255)] },
    FieldRules { field: "watermarkText", label: "Watermark text", rules: &[Rule::String, Rule::MaxLen(255)] },
]);

/// Whose kit the request addresses: the caller's own, or `?userId=` for admins
fn target_user(user: &Identity, params: &HashMap<String, String>) -> Result<i64, ApiError> {
    let Some(raw) = params.get("userId").map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(user.id);
    };
    let requested: i64 = raw
        .parse()
        .map_err(|_| ApiError::validation_error(vec![FieldError::new("userId", "userId must be an integer")]))?;
    if requested != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("You may only access your own brand kit"));
    }
    Ok(requested)
}

/// The brand kit owned by `user_id`, if any
pub async fn find_for_user(store: &dyn Store<BrandKit>, user_id: i64) -> Result<Option<BrandKit>, ApiError> {
    let mut found = store.select(&[Predicate::eq("user_id", user_id)], Window { offset: 0, limit: 1 }).await?;
    Ok(found.pop())
}

/// GET /api/brand-kit
pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<BrandKit> {
    let user_id = target_user(&user, &params)?;
    let kit = find_for_user(state.brand_kits.as_ref(), user_id)
        .await?
        .ok_or_else(ApiError::missing::<BrandKit>)?;
    Ok(ApiResponse::success(kit))
}

/// PUT /api/brand-kit: replace the kit, creating it on first use. The store
/// resolves "exists?" and the write in one step, keyed on `user_id`.
pub async fn put(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<HashMap<String, String>>,
    JsonBody(body): JsonBody,
) -> ApiResult<BrandKit> {
    let user_id = target_user(&user, &params)?;
    let fields: BrandKitFields = UPSERT.parse(body)?;

    let draft = BrandKitDraft { user_id, fields: fields.clone() };
    let upserted = state.brand_kits.upsert("user_id", draft, fields).await?;
    if upserted.created {
        tracing::info!("Created brand kit {} for user {}", upserted.row.id, user_id);
        Ok(ApiResponse::created(upserted.row))
    } else {
        Ok(ApiResponse::success(upserted.row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn params(user_id: &str) -> HashMap<String, String> {
        [("userId".to_string(), user_id.to_string())].into()
    }

    #[test]
    fn only_admins_address_other_users() {
        let user = Identity { id: 2, username: "user".into(), role: Role::User };
        let admin = Identity { id: 1, username: "admin".into(), role: Role::Admin };

        assert_eq!(target_user(&user, &HashMap::new()).unwrap(), 2);
        assert_eq!(target_user(&user, &params("2")).unwrap(), 2);
        assert_eq!(target_user(&user, &params("5")).unwrap_err().error_code(), "FORBIDDEN");
        assert_eq!(target_user(&admin, &params("5")).unwrap(), 5);
        assert_eq!(target_user(&admin, &params("x")).unwrap_err().status_code(), 400);
    }
}
