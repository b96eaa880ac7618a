pub mod ownership;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use ownership::{authorize_mutation, Denial};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A configured login account. Passwords are stored as lowercase SHA-256 hex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub password_sha256: String,
    pub role: Role,
}

impl UserAccount {
    pub fn with_password(id: i64, username: &str, password: &str, role: Role) -> Self {
        Self {
            id,
            username: username.to_string(),
            password_sha256: hash_password(password),
            role,
        }
    }

    fn password_matches(&self, candidate: &str) -> bool {
        let candidate = hash_password(candidate);
        // constant-time compare
        candidate.len() == self.password_sha256.len()
            && candidate
                .bytes()
                .zip(self.password_sha256.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Authenticated caller resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            exp,
            iat: now.timestamp(),
        }
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication token has expired")]
    Expired,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Issues and verifies bearer tokens against the configured user directory
pub struct AuthGate {
    secret: String,
    expiry_hours: u64,
    users: Vec<UserAccount>,
}

impl AuthGate {
    pub fn new(config: &SecurityConfig) -> Self {
        if config.jwt_secret.is_empty() {
            tracing::warn!("JWT_SECRET is not set; token issuance and verification will fail");
        }
        Self {
            secret: config.jwt_secret.clone(),
            expiry_hours: config.jwt_expiry_hours,
            users: config.users.clone(),
        }
    }

    pub fn expiry_hours(&self) -> u64 {
        self.expiry_hours
    }

    /// Check credentials and return the matching identity
    pub fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let account = self
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.password_matches(password) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
        })
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        let claims = Claims::new(identity, self.expiry_hours);
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let data = decode::<Claims>(token, &key, &Validation::default()).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        })?;
        Ok(data.claims.into())
    }
}
