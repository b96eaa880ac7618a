use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;
use crate::validation::{FieldRules, Rule, Schema};

const REWRITE: Schema = Schema::new(&[
    FieldRules { field: "text", label: "Text", rules: &[Rule::Required, Rule::String, Rule::NotBlank, Rule::MaxLen(200)] },
    FieldRules { field: "style", label: "Style", rules: &[Rule::String] },
]);

#[derive(Debug, Deserialize)]
struct RewriteBody {
    text: String,
    style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Rewritten {
    pub variants: Vec<String>,
}

/// POST /api/ai/rewrite
pub async fn rewrite(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<Rewritten> {
    let input: RewriteBody = REWRITE
        .parse(body)
        .map_err(|e| ApiError::unprocessable_entity(e.details))?;
    let variants = state.rewriter.rewrite(input.text.trim(), input.style.as_deref()).await;
    Ok(ApiResponse::success(Rewritten { variants }))
}
