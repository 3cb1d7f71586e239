use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::PASSWORD_MIN_LENGTH;

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterForm {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub confirmation: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Issued on login and registration; sent back as `Authorization: Bearer <token>`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub username: String,
}

/// Login and registration form view; `message` is set when a submission was rejected.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthFormView {
    pub message: Option<String>,
    pub password_min_length: usize,
}

impl AuthFormView {
    pub fn empty() -> Self {
        Self {
            message: None,
            password_min_length: PASSWORD_MIN_LENGTH,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty()
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}
