use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};

use crate::{
    dto::auth::{AuthFormView, LoginForm, RegisterForm, SessionResponse},
    error::AppResult,
    response::{ApiResponse, FormResponse, Meta},
    services::auth_service::{AuthOutcome, login_user, register_user},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout).post(logout))
}

fn into_auth_response(outcome: AuthOutcome, success_status: StatusCode, message: &str) -> Response {
    match outcome {
        AuthOutcome::SignedIn(session) => (
            success_status,
            Json(ApiResponse::success(message, session, Some(Meta::empty()))),
        )
            .into_response(),
        AuthOutcome::Rejected(reason) => {
            FormResponse::rerender(reason.clone(), AuthFormView::with_message(reason))
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Registration form", body = ApiResponse<AuthFormView>)
    ),
    tag = "Auth"
)]
pub async fn register_form() -> Json<ApiResponse<AuthFormView>> {
    Json(ApiResponse::success("Register", AuthFormView::empty(), None))
}

#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Account created and signed in", body = ApiResponse<SessionResponse>),
        (status = 200, description = "Rejected; form re-rendered with a message", body = ApiResponse<AuthFormView>)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let outcome = register_user(&state, form).await?;
    Ok(into_auth_response(outcome, StatusCode::CREATED, "User created"))
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", body = ApiResponse<AuthFormView>)
    ),
    tag = "Auth"
)]
pub async fn login_form() -> Json<ApiResponse<AuthFormView>> {
    Json(ApiResponse::success("Login", AuthFormView::empty(), None))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session token, or the form re-rendered with a message", body = ApiResponse<SessionResponse>)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let outcome = login_user(&state, form).await?;
    Ok(into_auth_response(outcome, StatusCode::OK, "Logged in"))
}

/// Tokens are stateless; the client drops its copy.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Redirect to the index")
    ),
    tag = "Auth"
)]
pub async fn logout() -> Redirect {
    Redirect::to("/")
}
