use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::products::{CreatedData, ProductCreateRequest, ProductList},
    error::AppResult,
    middleware::auth::CurrentUser,
    middleware::guard,
    models::ProductDetail,
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route(
            "/",
            post(create_product).layer(middleware::from_fn_with_state(state, guard::admin_only)),
        )
        .route("/{id}", get(get_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List every product", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product detail", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductCreateRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<CreatedData>),
        (status = 400, description = "Validation failure or duplicated name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreateRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    let id = product_service::create_product(&state, &user, payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/products/{id}"))],
        Json(ApiResponse::success(
            "Product created",
            CreatedData { id },
            Some(Meta::empty()),
        )),
    ))
}
