use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::error::{AppError, AppResult};
use crate::utils::session::Session;
use crate::AppState;

/// Resolve the bearer token into a [`Session`] for downstream handlers
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let session = Session::from_bearer(auth.token(), &state.config.jwt_secret)?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn session_of(request: &Request) -> AppResult<Session> {
    request
        .extensions()
        .get::<Session>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("No authentication found".to_string()))
}

/// Checkout and order history are for customers
pub async fn require_customer(request: Request, next: Next) -> AppResult<Response> {
    if session_of(&request)?.is_staff() {
        return Err(AppError::Forbidden("Customer access required".to_string()));
    }
    Ok(next.run(request).await)
}

/// Order management is for admins and super-admins
pub async fn require_staff(request: Request, next: Next) -> AppResult<Response> {
    if !session_of(&request)?.is_staff() {
        return Err(AppError::Forbidden("Staff access required".to_string()));
    }
    Ok(next.run(request).await)
}
