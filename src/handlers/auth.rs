use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Sign-in is not offered yet; sessions come from externally issued tokens.
pub async fn login(Json(payload): Json<LoginRequest>) -> AppResult<Json<()>> {
    tracing::info!(email = %payload.email, "Login attempt");
    Err(AppError::Disabled("Login functionality is currently disabled.".to_string()))
}

pub async fn register(Json(payload): Json<RegisterRequest>) -> AppResult<Json<()>> {
    tracing::info!(email = %payload.email, username = %payload.username, "Register attempt");
    Err(AppError::Disabled("Registration is currently disabled.".to_string()))
}
