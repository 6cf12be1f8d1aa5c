use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    middleware::auth::{CurrentUser, resolve_current_user},
    models::Role,
    state::AppState,
};

/// Access requirement of a route, evaluated before the handler body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    AnonymousOnly,
    Authenticated,
    AdminOnly,
}

impl RouteAccess {
    pub fn check(self, caller: Option<&CurrentUser>) -> Result<(), AppError> {
        match (self, caller) {
            (RouteAccess::Public, _) => Ok(()),
            (RouteAccess::AnonymousOnly, None) => Ok(()),
            (RouteAccess::AnonymousOnly, Some(_)) => Err(AppError::Forbidden),
            (RouteAccess::Authenticated, Some(_)) => Ok(()),
            (RouteAccess::AdminOnly, Some(user)) if user.role == Role::Admin => Ok(()),
            (RouteAccess::AdminOnly, Some(_)) => Err(AppError::Forbidden),
            (_, None) => Err(AppError::Unauthorized),
        }
    }
}

pub async fn anonymous_only(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(RouteAccess::AnonymousOnly, state, request, next).await
}

pub async fn authenticated(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(RouteAccess::Authenticated, state, request, next).await
}

pub async fn admin_only(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(RouteAccess::AdminOnly, state, request, next).await
}

async fn enforce(
    access: RouteAccess,
    state: AppState,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = resolve_current_user(&state, request.headers()).await?;
    access.check(caller.as_ref())?;

    if let Some(user) = caller {
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}
