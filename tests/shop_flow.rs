use std::collections::HashSet;

use axum_shop_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        products::{OptionCreateData, ProductCreateRequest},
        users::{RegisterRequest, UserUpdateRequest},
    },
    error::AppError,
    middleware::auth::CurrentUser,
    models::{Category, Role},
    routes::params::Pagination,
    services::{cart_service, product_service, user_service},
    state::AppState,
};
use sea_orm::{ConnectionTrait, Statement};
use uuid::Uuid;

// Integration flow: register -> admin creates a product aggregate ->
// catalog round trip -> user fills the cart -> profile update and delete.
#[tokio::test]
async fn catalog_cart_and_profile_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    // An empty store lists as an empty catalog, never an error.
    let empty = product_service::list_products(&state).await?;
    assert!(empty.data.expect("catalog data").items.is_empty());

    // Register a user; a duplicated email must fail without a second write.
    let user_id =
        user_service::register_user(&state.pool, register_request("user@example.com")).await?;
    let duplicate =
        user_service::register_user(&state.pool, register_request("user@example.com")).await;
    assert!(matches!(duplicate, Err(AppError::EmailDuplication(_))));
    let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind("user@example.com")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(user_count.0, 1);

    let admin_id = create_admin(&state, "admin@example.com").await?;
    let admin = current_user(admin_id, "admin@example.com", Role::Admin);
    let user = current_user(user_id, "user@example.com", Role::User);

    // Create the product aggregate.
    let product_id =
        product_service::create_product(&state, &admin, wallet_request("만두 지갑")).await?;

    // A duplicated name must fail and leave exactly one product behind.
    let duplicate = product_service::create_product(&state, &admin, wallet_request("만두 지갑")).await;
    assert!(matches!(duplicate, Err(AppError::NameDuplication(_))));

    let listing = product_service::list_products(&state).await?;
    let items = listing.data.expect("catalog data").items;
    assert_eq!(items.iter().filter(|p| p.name == "만두 지갑").count(), 1);
    assert_eq!(items[0].image_url.as_deref(), Some("url1"));

    // Detail round trip: every stored field comes back as written.
    let detail = product_service::get_product(&state, product_id)
        .await?
        .data
        .expect("product detail");
    assert_eq!(detail.id, product_id);
    assert_eq!(detail.name, "만두 지갑");
    assert_eq!(detail.original_price, 50000);
    assert_eq!(detail.discounted_price, 40000);
    assert_eq!(detail.description, "가죽 지갑입니다.");
    assert_eq!(detail.category, Category::Wallet);

    // The duplicated request keyword collapsed into a two-element set.
    assert_eq!(detail.keywords.len(), 2);
    let labels: HashSet<&str> = detail.keywords.iter().map(|k| k.label.as_str()).collect();
    assert_eq!(labels, HashSet::from(["가죽", "지갑"]));

    let urls: Vec<&str> = detail.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["url1", "url2"]);

    assert_eq!(detail.options.len(), 1);
    assert_eq!(detail.options[0].label, "색상");
    let children: Vec<&str> = detail.options[0]
        .options
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(children, vec!["브라운", "블랙"]);

    // An unknown id travels in the error.
    let missing = Uuid::new_v4();
    match product_service::get_product(&state, missing).await {
        Err(AppError::ProductNotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected ProductNotFound, got {other:?}"),
    }

    // Cart: add, list with product summary, then re-add to change quantity.
    cart_service::add_to_cart(
        &state.pool,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 2,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state.pool,
        &user,
        AddToCartRequest {
            product_id,
            quantity: 3,
        },
    )
    .await?;

    let cart = cart_service::list_cart(
        &state.pool,
        &user,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    let cart_items = cart.data.expect("cart data").items;
    assert_eq!(cart_items.len(), 1);
    assert_eq!(cart_items[0].quantity, 3);
    assert_eq!(cart_items[0].product.id, product_id);
    assert_eq!(cart_items[0].product.image_url.as_deref(), Some("url1"));

    // Profile update touches only the name.
    let updated = user_service::update_user(
        &state.pool,
        &user,
        UserUpdateRequest {
            name: "새이름".to_string(),
        },
    )
    .await?;
    assert_eq!(updated.data.expect("profile").name, "새이름");

    // Self-delete removes the user and its cart rows.
    user_service::delete_user(&state.pool, &user).await?;
    let remaining: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cart_products WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(remaining.0, 0);

    // The product survives its creator's customers.
    product_service::get_product(&state, product_id).await?;

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE cart_products, product_options, images, keywords, audit_logs, products, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}

async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind("admin")
    .bind("dummy")
    .bind("admin")
    .fetch_one(&state.pool)
    .await?;

    Ok(row.0)
}

fn current_user(id: Uuid, email: &str, role: Role) -> CurrentUser {
    CurrentUser {
        id,
        email: email.to_string(),
        name: email.split('@').next().unwrap_or("user").to_string(),
        role,
    }
}

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        name: "test".to_string(),
        password: "1234abcd".to_string(),
    }
}

fn wallet_request(name: &str) -> ProductCreateRequest {
    ProductCreateRequest {
        name: name.to_string(),
        original_price: 50000,
        discounted_price: 40000,
        description: "가죽 지갑입니다.".to_string(),
        category: Category::Wallet,
        keywords: vec![
            "가죽".to_string(),
            "지갑".to_string(),
            // Duplicated label collapses into the set.
            "가죽".to_string(),
        ],
        images: vec!["url1".to_string(), "url2".to_string()],
        options: vec![OptionCreateData {
            label: "색상".to_string(),
            price: None,
            options: vec![
                OptionCreateData {
                    label: "브라운".to_string(),
                    price: Some(1000),
                    options: vec![],
                },
                OptionCreateData {
                    label: "블랙".to_string(),
                    price: Some(2000),
                    options: vec![],
                },
            ],
        }],
    }
}
