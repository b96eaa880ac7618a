use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::state::AppState;
use crate::validation::{FieldRules, Rule, Schema};

const LOGIN: Schema = Schema::new(&[
    FieldRules {
        field: "username",
        label: "Username",
        rules: &[Rule::Required, Rule::String, Rule::MinLen(3), Rule::MaxLen(50)],
    },
    FieldRules { field: "password", label: "Password", rules: &[Rule::Required, Rule::String, Rule::MinLen(6)] },
]);

const VERIFY: Schema = Schema::new(&[FieldRules {
    field: "token",
    label: "Token",
    rules: &[Rule::Required, Rule::String, Rule::NotBlank],
}]);

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct VerifyBody {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub user: Identity,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Identity,
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<LoginResponse> {
    let input: LoginBody = LOGIN.parse(body)?;
    let user = state.auth.login(input.username.trim(), &input.password).map_err(|e| {
        tracing::info!("Failed login for {}", input.username.trim());
        e
    })?;
    let token = state.auth.issue(&user)?;
    tracing::info!("User {} logged in", user.username);
    Ok(ApiResponse::success(LoginResponse { token, user, expires_in: state.auth.expiry_hours() * 3600 }))
}

/// POST /api/auth/verify
pub async fn verify(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<VerifyResponse> {
    let input: VerifyBody = VERIFY.parse(body)?;
    let user = state.auth.verify(input.token.trim())?;
    Ok(ApiResponse::success(VerifyResponse { valid: true, user }))
}

/// GET /api/auth/me
pub async fn me(AuthUser(user): AuthUser) -> ApiResult<Profile> {
    Ok(ApiResponse::success(Profile { user }))
}
