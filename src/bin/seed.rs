use auction_marketplace::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

const DEFAULT_CATEGORIES: &[&str] = &[
    "Books",
    "Collectibles",
    "Electronics",
    "Fashion",
    "Home",
    "Sports",
    "Toys",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&pool);
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let created = seed_categories(&orm).await?;
    let user_id = ensure_user(&pool, "demo", "demo@example.com", "demo-password").await?;

    println!("Seed completed. {created} new categories, demo user ID: {user_id}");
    Ok(())
}

async fn seed_categories(orm: &DatabaseConnection) -> anyhow::Result<usize> {
    let mut created = 0;
    for name in DEFAULT_CATEGORIES {
        let existing = Categories::find()
            .filter(CategoryCol::Name.eq(*name))
            .one(orm)
            .await?;
        if existing.is_some() {
            continue;
        }
        CategoryActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
        }
        .insert(orm)
        .await?;
        created += 1;
    }
    Ok(created)
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    Ok(user_id)
}
