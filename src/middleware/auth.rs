use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    dto::auth::Claims,
    error::{AppError, AppResult},
    models::{Role, User},
    state::AppState,
};

/// The caller resolved from a bearer token, loaded from storage so the
/// role reflects the stored user rather than a stale claim.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Resolve the caller from the Authorization header.
///
/// No header means an anonymous caller; a header that is present but
/// malformed, expired or pointing at a deleted user is rejected.
pub async fn resolve_current_user(
    state: &AppState,
    headers: &HeaderMap,
) -> AppResult<Option<CurrentUser>> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header.to_str().map_err(|_| AppError::InvalidToken)?;
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::InvalidToken);
    };
    let token = token.trim();

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::InvalidToken)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;
    let user = user.ok_or(AppError::InvalidToken)?;

    let role = user
        .role
        .parse::<Role>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    Ok(Some(CurrentUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role,
    }))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // Inserted by the route guard; a handler asking for a CurrentUser
        // on an unguarded route is a wiring error, surfaced as 401.
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
