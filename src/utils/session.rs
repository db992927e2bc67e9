use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

/// Who is calling. Tokens are issued by the account service; this side only
/// reads the user id and role out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: Uuid,
    role: UserRole,
}

impl Session {
    /// Decode an HS256 bearer token. Expired or tampered tokens are
    /// `Unauthorized`.
    pub fn from_bearer(token: &str, secret: &str) -> AppResult<Self> {
        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?
        .claims;

        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
        })
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
