use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_shop_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool},
    dto::products::{OptionCreateData, ProductCreateRequest},
    error::AppError,
    middleware::auth::CurrentUser,
    models::{Category, Role},
    services::product_service,
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user", "user1234", "user").await?;

    let state = AppState { pool, orm };
    let admin = CurrentUser {
        id: admin_id,
        email: "admin@example.com".to_string(),
        name: "admin".to_string(),
        role: Role::Admin,
    };
    seed_products(&state, &admin).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(state: &AppState, admin: &CurrentUser) -> anyhow::Result<()> {
    for request in sample_products() {
        let name = request.name.clone();
        match product_service::create_product(state, admin, request).await {
            Ok(id) => println!("Seeded product {name} ({id})"),
            Err(AppError::NameDuplication(_)) => println!("Product {name} already present"),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn sample_products() -> Vec<ProductCreateRequest> {
    vec![
        ProductCreateRequest {
            name: "Classic Leather Wallet".to_string(),
            original_price: 50000,
            discounted_price: 40000,
            description: "Hand-stitched bifold wallet".to_string(),
            category: Category::Wallet,
            keywords: vec!["leather".to_string(), "wallet".to_string()],
            images: vec!["https://example.com/wallet-front.jpg".to_string()],
            options: vec![OptionCreateData {
                label: "Color".to_string(),
                price: None,
                options: vec![
                    OptionCreateData {
                        label: "Brown".to_string(),
                        price: Some(0),
                        options: vec![],
                    },
                    OptionCreateData {
                        label: "Black".to_string(),
                        price: Some(1000),
                        options: vec![],
                    },
                ],
            }],
        },
        ProductCreateRequest {
            name: "Saddle Leather Belt".to_string(),
            original_price: 70000,
            discounted_price: 63000,
            description: "Full-grain belt with brass buckle".to_string(),
            category: Category::Belt,
            keywords: vec!["leather".to_string(), "belt".to_string()],
            images: vec!["https://example.com/belt.jpg".to_string()],
            options: vec![],
        },
        ProductCreateRequest {
            name: "Minimal Key Ring".to_string(),
            original_price: 15000,
            discounted_price: 12000,
            description: "Slim key ring with snap closure".to_string(),
            category: Category::KeyRing,
            keywords: vec!["keyring".to_string()],
            images: vec!["https://example.com/keyring.jpg".to_string()],
            options: vec![],
        },
    ]
}
