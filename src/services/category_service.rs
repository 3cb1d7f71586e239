use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::{categories::CategoryList, listings::ListingList},
    entity::categories::Entity as Categories,
    error::{AppError, AppResult},
    models::{Category, ListingSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::listing_service::LISTING_SUMMARY_SELECT,
    state::AppState,
};

pub async fn all_categories(pool: &DbPool) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(categories)
}

pub async fn list_categories(pool: &DbPool) -> AppResult<ApiResponse<CategoryList>> {
    let items = all_categories(pool).await?;
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

/// Ids among `ids` that name no category.
pub async fn unknown_categories(pool: &DbPool, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(ids
        .iter()
        .filter(|id| !found.iter().any(|(found_id,)| found_id == *id))
        .copied()
        .collect())
}

/// Every listing tagged with the category, closed ones included.
pub async fn listings_for_category(
    state: &AppState,
    viewer: Option<Uuid>,
    category_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ListingList>> {
    let category = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let (page, limit, offset) = pagination.normalize();
    let sql = format!(
        "{LISTING_SUMMARY_SELECT} \
         JOIN listing_categories lc ON lc.listing_id = l.id AND lc.category_id = $2 \
         ORDER BY d.created_at DESC LIMIT $3 OFFSET $4"
    );
    let items = sqlx::query_as::<_, ListingSummary>(&sql)
        .bind(viewer)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM listing_categories lc
        JOIN listing_details d ON d.listing_id = lc.listing_id
        WHERE lc.category_id = $1
        "#,
    )
    .bind(category_id)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        format!("Listings in {}", category.name),
        ListingList { items },
        Some(meta),
    ))
}
