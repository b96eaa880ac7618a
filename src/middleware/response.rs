use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::query::PageResult;

/// Success envelope: `{"data": T, "meta"?: {...}}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: Option<Value>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self { data, meta: None, status_code: None }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self { data, meta: None, status_code: Some(StatusCode::CREATED) }
    }

    pub fn with_meta(mut self, meta: impl Serialize) -> Self {
        self.meta = serde_json::to_value(meta).ok();
        self
    }
}

impl<R: Serialize> ApiResponse<Vec<R>> {
    /// List envelope with page metadata in `meta`
    pub fn page(result: PageResult<R>) -> Self {
        Self::success(result.items).with_meta(result.pagination)
    }
}

impl ApiResponse<Value> {
    /// `{"data": {"message": ...}}`, used for deletes
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(json!({ "message": message.into() }))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => return ApiError::internal(format!("Failed to serialize response data: {}", e)).into_response(),
        };

        let mut envelope = json!({ "data": data_value });
        if let Some(meta) = self.meta {
            envelope["meta"] = meta;
        }

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
