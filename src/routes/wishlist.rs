use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        listings::{ListingList, SubmitForm},
        wishlist::WishlistAction,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, FormResponse, referer_path},
    routes::params::Pagination,
    services::{listing_service, wishlist_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wishlist", get(list_wishlist))
        .route("/wishlist/{id}", post(update_wishlist))
}

#[utoipa::path(
    get,
    path = "/wishlist",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Caller's wishlisted listings", body = ApiResponse<ListingList>),
        (status = 401, description = "Login required")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ListingList>>> {
    let resp = wishlist_service::list_wishlist(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/wishlist/{id}",
    params(
        ("id" = Uuid, Path, description = "Listing ID")
    ),
    request_body(content = SubmitForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect to the referring page"),
        (status = 401, description = "Login required"),
        (status = 404, description = "Listing not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn update_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> AppResult<FormResponse<()>> {
    match WishlistAction::from_submit(&form.submit) {
        Some(action) => wishlist_service::update_wishlist(&state, &user, id, action).await?,
        None => listing_service::ensure_listing_exists(&state, id).await?,
    }
    Ok(FormResponse::redirect(referer_path(&headers, "/")))
}
