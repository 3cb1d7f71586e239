use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, Set, SqlErr};
use uuid::Uuid;

use crate::{
    config::AuthSettings,
    dto::auth::{Claims, LoginForm, RegisterForm, SessionResponse},
    entity::users::ActiveModel as UserActive,
    error::{AppError, AppResult},
    state::AppState,
    validation,
};

/// Result of a login or registration attempt that passed the transport layer.
#[derive(Debug)]
pub enum AuthOutcome {
    SignedIn(SessionResponse),
    /// Rejected with a message for the re-rendered form.
    Rejected(String),
}

pub async fn register_user(state: &AppState, form: RegisterForm) -> AppResult<AuthOutcome> {
    let RegisterForm {
        username,
        email,
        password,
        confirmation,
    } = form;

    if let Err(message) = validation::password(&password, &confirmation) {
        return Ok(AuthOutcome::Rejected(message));
    }
    let username = match validation::username(&username) {
        Ok(username) => username,
        Err(message) => return Ok(AuthOutcome::Rejected(message)),
    };

    let password_hash = hash_password(&password)?;

    let inserted = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.clone()),
        email: Set(email.trim().to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(err) => {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                tracing::debug!(%username, "username already taken");
                return Ok(AuthOutcome::Rejected("Username already taken.".into()));
            }
            return Err(err.into());
        }
    };

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    let session = issue_session(&state.auth, user.id, &user.username)?;
    Ok(AuthOutcome::SignedIn(session))
}

pub async fn login_user(state: &AppState, form: LoginForm) -> AppResult<AuthOutcome> {
    let LoginForm { username, password } = form;
    let row: Option<(Uuid, String, String)> =
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = $1")
            .bind(username.as_str())
            .fetch_optional(&state.pool)
            .await?;

    let rejected = || AuthOutcome::Rejected("Invalid username and/or password.".into());

    let Some((user_id, username, password_hash)) = row else {
        return Ok(rejected());
    };

    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        tracing::debug!(%username, "login rejected");
        return Ok(rejected());
    }

    tracing::info!(%user_id, %username, "user logged in");
    let session = issue_session(&state.auth, user_id, &username)?;
    Ok(AuthOutcome::SignedIn(session))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(password_hash)
}

/// Sign a session token for `user_id`.
pub fn issue_session(
    settings: &AuthSettings,
    user_id: Uuid,
    username: &str,
) -> AppResult<SessionResponse> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(settings.token_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(SessionResponse {
        token,
        username: username.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::verify_token;

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".into(),
            token_ttl_hours: 1,
        }
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let user_id = Uuid::new_v4();
        let session = issue_session(&settings(), user_id, "alice").unwrap();
        let user = verify_token(&session.token, &settings()).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let session = issue_session(&settings(), Uuid::new_v4(), "alice").unwrap();
        let other = AuthSettings {
            jwt_secret: "another-secret".into(),
            token_ttl_hours: 1,
        };
        assert!(matches!(
            verify_token(&session.token, &other),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
