use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{config::AuthSettings, dto::auth::Claims, error::AppError, state::AppState};

/// Authenticated caller, taken from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}

/// Optional caller identity for views that anonymous visitors may also see.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) => Ok(Some(token.trim())),
        None => Err(AppError::Unauthorized("Invalid Authorization scheme".into())),
    }
}

/// Check a session token and turn its claims into the caller's identity.
pub fn verify_token(token: &str, settings: &AuthSettings) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        username: decoded.claims.username,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Unauthorized("Login required".into()))?;
        verify_token(token, &state.auth)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match bearer_token(parts) {
            Ok(Some(token)) => match verify_token(token, &state.auth) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::debug!(error = %err, "ignoring unusable session token");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring malformed Authorization header");
                None
            }
        };
        Ok(MaybeAuthUser(user))
    }
}
