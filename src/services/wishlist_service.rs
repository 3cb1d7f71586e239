use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    dto::{listings::ListingList, wishlist::WishlistAction},
    entity::wishlists::{ActiveModel as WishlistActive, Column as WishlistCol, Entity as Wishlists},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ListingSummary,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::listing_service::{LISTING_SUMMARY_SELECT, ensure_listing_exists},
    state::AppState,
};

/// Apply a wishlist action. Adding an entry that exists or removing one that
/// does not leaves the wishlist unchanged.
pub async fn update_wishlist(
    state: &AppState,
    user: &AuthUser,
    listing_id: Uuid,
    action: WishlistAction,
) -> AppResult<()> {
    ensure_listing_exists(state, listing_id).await?;

    let changed = match action {
        WishlistAction::Add => {
            let entry = WishlistActive {
                user_id: Set(user.user_id),
                listing_id: Set(listing_id),
                created_at: Set(Utc::now().into()),
            };
            Wishlists::insert(entry)
                .on_conflict(
                    OnConflict::columns([WishlistCol::UserId, WishlistCol::ListingId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&state.orm)
                .await?
        }
        WishlistAction::Remove => {
            Wishlists::delete_many()
                .filter(WishlistCol::UserId.eq(user.user_id))
                .filter(WishlistCol::ListingId.eq(listing_id))
                .exec(&state.orm)
                .await?
                .rows_affected
        }
    };

    tracing::info!(%listing_id, user_id = %user.user_id, ?action, changed, "wishlist updated");
    Ok(())
}

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ListingList>> {
    let (page, limit, offset) = pagination.normalize();
    let sql = format!(
        "{LISTING_SUMMARY_SELECT} \
         JOIN wishlists mine ON mine.listing_id = l.id AND mine.user_id = $1 \
         ORDER BY mine.created_at DESC LIMIT $2 OFFSET $3"
    );
    let items = sqlx::query_as::<_, ListingSummary>(&sql)
        .bind(user.user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM wishlists w
        JOIN listing_details d ON d.listing_id = w.listing_id
        WHERE w.user_id = $1
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Wishlist", ListingList { items }, Some(meta)))
}
