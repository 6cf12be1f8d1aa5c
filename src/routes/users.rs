use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::products::CreatedData,
    dto::users::{RegisterRequest, UserResponse, UserUpdateRequest},
    error::AppResult,
    middleware::auth::CurrentUser,
    middleware::guard,
    response::{ApiResponse, Meta},
    services::user_service,
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(create_user).layer(middleware::from_fn_with_state(
                state.clone(),
                guard::anonymous_only,
            )),
        )
        .route(
            "/me",
            get(me)
                .patch(update_me)
                .delete(delete_me)
                .layer(middleware::from_fn_with_state(state, guard::authenticated)),
        )
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<CreatedData>),
        (status = 400, description = "Validation failure or duplicated email"),
        (status = 403, description = "Already authenticated"),
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    let id = user_service::register_user(&state.pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/users/{id}"))],
        Json(ApiResponse::success(
            "User created",
            CreatedData { id },
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn me(user: CurrentUser) -> AppResult<Json<ApiResponse<UserResponse>>> {
    Ok(Json(user_service::current_user_profile(&user)))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid body"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UserUpdateRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    payload.validate()?;
    let resp = user_service::update_user(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/users/me",
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<StatusCode> {
    user_service::delete_user(&state.pool, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
