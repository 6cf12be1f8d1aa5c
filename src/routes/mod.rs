use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod users;

// Build the API router without binding state; the state handle is still
// needed here so each route guard can resolve the caller.
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/products", products::router(state.clone()))
        .nest("/users", users::router(state.clone()))
        .nest("/cart", cart::router(state))
        .nest("/auth", auth::router())
}
