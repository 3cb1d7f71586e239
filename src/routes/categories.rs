use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{categories::CategoryList, listings::ListingList},
    error::AppResult,
    middleware::auth::MaybeAuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/category", get(list_categories))
        .route("/listing_filtered/category/{id}", get(listings_by_category))
}

#[utoipa::path(
    get,
    path = "/category",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state.pool).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/listing_filtered/category/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Listings in the category, closed ones included", body = ApiResponse<ListingList>),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn listings_by_category(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ListingList>>> {
    let resp =
        category_service::listings_for_category(&state, viewer.user_id(), id, pagination).await?;
    Ok(Json(resp))
}
