use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Identity};
use crate::error::ApiError;
use crate::state::AppState;

/// Outcome of inspecting the `Authorization` header
#[derive(Clone, Debug)]
pub enum Authentication {
    Anonymous,
    Authenticated(Identity),
    Rejected(AuthError),
}

impl Authentication {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Authentication::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// The caller's identity, or the error an auth-required route returns
    pub fn require(&self) -> Result<&Identity, ApiError> {
        match self {
            Authentication::Authenticated(identity) => Ok(identity),
            Authentication::Anonymous => Err(ApiError::auth_required()),
            Authentication::Rejected(err) => Err(err.clone().into()),
        }
    }
}

/// Resolve the bearer token (if any) once per request. Never rejects: each
/// route decides through its extractor whether authentication is required.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let authentication = match extract_bearer(request.headers()) {
        None => Authentication::Anonymous,
        Some(Err(err)) => Authentication::Rejected(err),
        Some(Ok(token)) => match state.auth.verify(token) {
            Ok(identity) => Authentication::Authenticated(identity),
            Err(err) => {
                tracing::debug!("Rejected bearer token: {}", err);
                Authentication::Rejected(err)
            }
        },
    };
    request.extensions_mut().insert(authentication);
    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_bearer(headers: &HeaderMap) -> Option<Result<&str, AuthError>> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidToken);
    Some(token)
}

fn authentication(parts: &Parts) -> Authentication {
    parts
        .extensions
        .get::<Authentication>()
        .cloned()
        .unwrap_or(Authentication::Anonymous)
}

/// Required authentication: `AUTH_REQUIRED` without a token, `AUTH_ERROR`
/// for a bad one.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authentication(parts).require().cloned().map(AuthUser)
    }
}

/// Optional authentication for public routes
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Authentication);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(authentication(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert!(extract_bearer(&HeaderMap::new()).is_none());
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap().unwrap(), "abc.def");
        assert!(extract_bearer(&headers("Basic dXNlcg==")).unwrap().is_err());
        assert!(extract_bearer(&headers("Bearer   ")).unwrap().is_err());
    }

    #[test]
    fn require_maps_each_state() {
        assert_eq!(Authentication::Anonymous.require().unwrap_err().error_code(), "AUTH_REQUIRED");
        let rejected = Authentication::Rejected(AuthError::Expired);
        assert_eq!(rejected.require().unwrap_err().error_code(), "AUTH_ERROR");
        assert!(rejected.identity().is_none());
    }
}
