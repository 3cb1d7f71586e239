use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entity::comments::ActiveModel as CommentActive,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Comment,
    state::AppState,
};

/// Comments on a listing, oldest first, with their authors' usernames.
pub async fn list_comments(pool: &DbPool, listing_id: Uuid) -> AppResult<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT c.id, c.body, c.user_id, u.username, c.listing_id, c.created_at
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.listing_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(listing_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}

/// Append a comment; `body` has already been validated as non-blank.
pub async fn add_comment(
    state: &AppState,
    user: &AuthUser,
    listing_id: Uuid,
    body: String,
) -> AppResult<Comment> {
    let comment = CommentActive {
        id: Set(Uuid::new_v4()),
        body: Set(body),
        user_id: Set(user.user_id),
        listing_id: Set(listing_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(%listing_id, user_id = %user.user_id, comment_id = %comment.id, "comment added");

    Ok(Comment {
        id: comment.id,
        body: comment.body,
        user_id: comment.user_id,
        username: user.username.clone(),
        listing_id: comment.listing_id,
        created_at: comment.created_at.with_timezone(&Utc),
    })
}
