use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::models::asset::{Asset, AssetDraft};
use crate::database::models::Template;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::services::render::{render_to_file, RenderRequest};
use crate::state::AppState;
use crate::validation::{FieldError, FieldRules, Rule, Schema};

use super::brand_kits::find_for_user;

const RENDER: Schema = Schema::new(&[
    FieldRules { field: "html", label: "HTML content", rules: &[Rule::Required, Rule::String, Rule::NotBlank] },
    FieldRules { field: "width", label: "Width", rules: &[Rule::Required, Rule::Integer, Rule::Range(1, 4000)] },
    FieldRules { field: "height", label: "Height", rules: &[Rule::Required, Rule::Integer, Rule::Range(1, 4000)] },
    FieldRules { field: "watermark", label: "Watermark", rules: &[Rule::String] },
    FieldRules { field: "templateId", label: "Template ID", rules: &[Rule::Integer] },
]);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderBody {
    html: String,
    width: i64,
    height: i64,
    watermark: Option<String>,
    template_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendered {
    pub image_url: String,
    pub asset: Asset,
}

/// POST /api/render
///
/// Screenshots the HTML, stores the PNG and records it as an asset owned by
/// the caller. Without an explicit `watermark` the caller's brand kit
/// watermark is applied, if set.
pub async fn render(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(body): JsonBody,
) -> ApiResult<Rendered> {
    let input: RenderBody = RENDER.parse(body)?;

    let max = state.config.render.max_dimension;
    let mut oversize = Vec::new();
    for (field, value) in [("width", input.width), ("height", input.height)] {
        if value > max {
            oversize.push(FieldError::new(field, format!("{} cannot exceed {} pixels", field, max)));
        }
    }
    if !oversize.is_empty() {
        return Err(ApiError::validation_error(oversize));
    }

    if let Some(template_id) = input.template_id {
        state.templates.get(template_id).await?.ok_or_else(ApiError::missing::<Template>)?;
    }

    let watermark = match input.watermark {
        Some(text) => Some(text),
        None => find_for_user(state.brand_kits.as_ref(), user.id)
            .await?
            .and_then(|kit| kit.watermark_text),
    };

    let request = RenderRequest { html: input.html, width: input.width, height: input.height };
    let stored = render_to_file(state.renderer.as_ref(), &state.storage, request, watermark.as_deref()).await?;

    let draft = AssetDraft {
        user_id: user.id,
        template_id: input.template_id,
        url: stored.url.clone(),
        width: input.width,
        height: input.height,
    };
    let asset = match state.assets.insert(draft).await {
        Ok(asset) => asset,
        Err(e) => {
            if let Err(cleanup) = state.storage.remove_by_url(&stored.url).await {
                tracing::warn!("Failed to remove orphaned render {}: {}", stored.filename, cleanup);
            }
            return Err(e.into());
        }
    };
    tracing::info!("User {} rendered asset {} ({}x{})", user.id, asset.id, asset.width, asset.height);

    Ok(ApiResponse::created(Rendered { image_url: stored.url, asset }))
}
