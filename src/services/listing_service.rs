use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::listings::{ListingDetailView, ListingList, NewListing},
    entity::{
        listing_categories::{ActiveModel as ListingCategoryActive, Entity as ListingCategories},
        listing_details::ActiveModel as ListingDetailActive,
        listings::{ActiveModel as ListingActive, Column as ListingCol, Entity as Listings, Model as ListingModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, Comment, Listing, ListingDetail, ListingSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{bid_service, comment_service},
    state::AppState,
    validation::FieldErrors,
};

/// Shared projection for listing indexes. `$1` is the viewer id (may be NULL).
pub(crate) const LISTING_SUMMARY_SELECT: &str = r#"
    SELECT l.id, l.title, l.description, l.starting_bid, l.photo, l.active,
           (SELECT MAX(b.amount) FROM bids b WHERE b.listing_id = l.id) AS current_bid,
           EXISTS (
               SELECT 1 FROM wishlists w WHERE w.listing_id = l.id AND w.user_id = $1
           ) AS on_wishlist,
           d.created_at
    FROM listings l
    JOIN listing_details d ON d.listing_id = l.id
"#;

/// Open listings, newest first.
pub async fn list_listings(
    pool: &DbPool,
    viewer: Option<Uuid>,
    pagination: Pagination,
) -> AppResult<ApiResponse<ListingList>> {
    let (page, limit, offset) = pagination.normalize();
    let sql = format!(
        "{LISTING_SUMMARY_SELECT} WHERE l.active ORDER BY d.created_at DESC LIMIT $2 OFFSET $3"
    );
    let items = sqlx::query_as::<_, ListingSummary>(&sql)
        .bind(viewer)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)
        FROM listings l
        JOIN listing_details d ON d.listing_id = l.id
        WHERE l.active
        "#,
    )
    .fetch_one(pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Listings", ListingList { items }, Some(meta)))
}

/// Insert a listing, its detail record and its category links in one
/// transaction; nothing is kept if any insert fails.
pub async fn create_listing(
    state: &AppState,
    user: &AuthUser,
    new_listing: NewListing,
) -> AppResult<Listing> {
    let NewListing {
        title,
        description,
        starting_bid,
        photo,
        category_ids,
    } = new_listing;

    let txn = state.orm.begin().await?;

    let listing = ListingActive {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        starting_bid: Set(starting_bid),
        photo: Set(photo),
        active: Set(true),
    }
    .insert(&txn)
    .await?;

    let now = Utc::now();
    ListingDetailActive {
        listing_id: Set(listing.id),
        created_by: Set(user.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    if !category_ids.is_empty() {
        let links = category_ids.iter().map(|category_id| ListingCategoryActive {
            listing_id: Set(listing.id),
            category_id: Set(*category_id),
        });
        ListingCategories::insert_many(links)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::info!(
        listing_id = %listing.id,
        user_id = %user.user_id,
        categories = category_ids.len(),
        "listing created"
    );

    let categories = listing_categories(&state.pool, listing.id).await?;
    Ok(listing_from_entity(listing, categories))
}

/// Everything the detail page shows for `listing_id`, with empty form errors.
pub async fn listing_detail_view(
    state: &AppState,
    viewer: Option<&AuthUser>,
    listing_id: Uuid,
) -> AppResult<ListingDetailView> {
    let viewer_id = viewer.map(|user| user.user_id);

    let listing = Listings::find_by_id(listing_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = load_detail(&state.pool, listing_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Listing has no detail record".into()))?;

    let categories = listing_categories(&state.pool, listing_id).await?;
    let non_categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.name
        FROM categories c
        WHERE NOT EXISTS (
            SELECT 1 FROM listing_categories lc
            WHERE lc.category_id = c.id AND lc.listing_id = $1
        )
        ORDER BY c.name
        "#,
    )
    .bind(listing_id)
    .fetch_all(&state.pool)
    .await?;

    let bid_status = bid_service::load_bid_status(&state.pool, listing_id, viewer_id).await?;
    let comments: Vec<Comment> = comment_service::list_comments(&state.pool, listing_id).await?;

    let on_wishlist = match viewer_id {
        Some(user_id) => {
            let row: Option<(Uuid,)> = sqlx::query_as(
                "SELECT listing_id FROM wishlists WHERE user_id = $1 AND listing_id = $2",
            )
            .bind(user_id)
            .bind(listing_id)
            .fetch_optional(&state.pool)
            .await?;
            row.is_some()
        }
        None => false,
    };

    Ok(ListingDetailView {
        is_seller: viewer_id == Some(detail.created_by),
        listing: listing_from_entity(listing, categories),
        detail,
        bid_status,
        comments,
        non_categories,
        on_wishlist,
        error_message: None,
        bid_errors: FieldErrors::new(),
        comment_errors: FieldErrors::new(),
    })
}

/// Mark a listing inactive. Any authenticated caller may do this.
pub async fn close_auction(state: &AppState, user: &AuthUser, listing_id: Uuid) -> AppResult<()> {
    let result = Listings::update_many()
        .col_expr(ListingCol::Active, Expr::value(false))
        .filter(ListingCol::Id.eq(listing_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(%listing_id, user_id = %user.user_id, "auction closed");
    Ok(())
}

pub async fn ensure_listing_exists(state: &AppState, listing_id: Uuid) -> AppResult<()> {
    match Listings::find_by_id(listing_id).one(&state.orm).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound),
    }
}

async fn load_detail(pool: &DbPool, listing_id: Uuid) -> AppResult<Option<ListingDetail>> {
    let detail = sqlx::query_as::<_, ListingDetail>(
        r#"
        SELECT d.listing_id, d.created_by, u.username AS seller, d.created_at, d.updated_at
        FROM listing_details d
        JOIN users u ON u.id = d.created_by
        WHERE d.listing_id = $1
        "#,
    )
    .bind(listing_id)
    .fetch_optional(pool)
    .await?;
    Ok(detail)
}

async fn listing_categories(pool: &DbPool, listing_id: Uuid) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT c.id, c.name
        FROM categories c
        JOIN listing_categories lc ON lc.category_id = c.id
        WHERE lc.listing_id = $1
        ORDER BY c.name
        "#,
    )
    .bind(listing_id)
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

fn listing_from_entity(model: ListingModel, categories: Vec<Category>) -> Listing {
    Listing {
        id: model.id,
        title: model.title,
        description: model.description,
        starting_bid: model.starting_bid,
        photo: model.photo,
        active: model.active,
        categories,
    }
}
