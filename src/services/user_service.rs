use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::users::{RegisterRequest, UserResponse, UserUpdateRequest},
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::User,
    response::ApiResponse,
};

/// Register a new user with the default role. The email existence check
/// is the fast path; the UNIQUE constraint catches the concurrent case.
pub async fn register_user(pool: &DbPool, payload: RegisterRequest) -> AppResult<Uuid> {
    let RegisterRequest {
        email,
        name,
        password,
    } = payload;

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::EmailDuplication(email));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let id = Uuid::new_v4();
    let inserted = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(id)
    .bind(email.as_str())
    .bind(name.as_str())
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::EmailDuplication(email));
        }
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(user.id)
}

/// Current user's profile.
pub fn current_user_profile(user: &CurrentUser) -> ApiResponse<UserResponse> {
    ApiResponse::success("Me", UserResponse::of_current(user), None)
}

/// Change the name of the already-resolved current user.
pub async fn update_user(
    pool: &DbPool,
    user: &CurrentUser,
    payload: UserUpdateRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated: User = sqlx::query_as("UPDATE users SET name = $2 WHERE id = $1 RETURNING *")
        .bind(user.id)
        .bind(payload.name.as_str())
        .fetch_one(pool)
        .await?;

    Ok(ApiResponse::success("Updated", UserResponse::of(&updated), None))
}

/// Remove the current user; cart rows go with the row via the FK cascade.
pub async fn delete_user(pool: &DbPool, user: &CurrentUser) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}
