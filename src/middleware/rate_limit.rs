use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{self, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use tower_governor::{
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::{GlobalKeyExtractor, KeyExtractor, PeerIpKeyExtractor},
    GovernorError, GovernorLayer,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::utils::session::Session;

type Governed<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, Body>;

/// Per client IP. Needs `ConnectInfo`, so it is applied in `main`.
pub type IpGovernorLayer = Governed<PeerIpKeyExtractor>;

/// Per signed-in user; must sit inside `auth_middleware`.
pub type SessionGovernorLayer = Governed<SessionKeyExtractor>;

/// One bucket shared by every client.
pub type RetryGovernorLayer = Governed<GlobalKeyExtractor>;

/// Keys requests on the user id of the [`Session`] left by `auth_middleware`
#[derive(Debug, Clone, Copy)]
pub struct SessionKeyExtractor;

impl KeyExtractor for SessionKeyExtractor {
    type Key = Uuid;

    fn extract<T>(&self, req: &http::Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<Session>()
            .map(|session| session.user_id)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// `per_minute` requests a minute, all of which may arrive at once.
fn governor_config<K: KeyExtractor>(per_minute: u32, key: K) -> GovernorConfig<K, NoOpMiddleware<QuantaInstant>> {
    let per_minute = per_minute.max(1);
    GovernorConfigBuilder::default()
        .per_millisecond((60_000 / u64::from(per_minute)).max(1))
        .burst_size(per_minute)
        .key_extractor(key)
        .finish()
        .expect("period and burst are non-zero")
}

pub fn ip_governor(per_minute: u32) -> IpGovernorLayer {
    GovernorLayer::new(governor_config(per_minute, PeerIpKeyExtractor))
        .error_handler(rate_limit_error_handler)
}

pub fn session_governor(per_minute: u32) -> SessionGovernorLayer {
    GovernorLayer::new(governor_config(per_minute, SessionKeyExtractor))
        .error_handler(rate_limit_error_handler)
}

/// Every retry restarts the shared acquisition, so retries are limited
/// across all clients rather than per caller.
pub fn retry_governor(per_minute: u32) -> RetryGovernorLayer {
    GovernorLayer::new(governor_config(per_minute, GlobalKeyExtractor))
        .error_handler(rate_limit_error_handler)
}

/// Governor rejections in the API's JSON error shape, keeping `retry-after`
pub fn rate_limit_error_handler(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            let mut response = AppError::TooManyRequests(format!(
                "Too many requests. Try again in {}s.",
                wait_time
            ))
            .into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::Internal("Rate limiter could not identify the caller".to_string())
                .into_response()
        }
        GovernorError::Other { code, msg, .. } => {
            let message = msg.unwrap_or_else(|| code.to_string());
            (code, axum::Json(serde_json::json!({ "error": message }))).into_response()
        }
    }
}

/// Log every request with its latency; rejected and failed ones at `warn`
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        StatusCode::TOO_MANY_REQUESTS => tracing::warn!(
            client_ip = %addr.ip(), %method, %path, elapsed_ms,
            "Rate limited"
        ),
        s if s.is_server_error() => tracing::warn!(
            client_ip = %addr.ip(), %method, %path, status = %s, elapsed_ms,
            "Request failed"
        ),
        s => tracing::debug!(
            client_ip = %addr.ip(), %method, %path, status = %s, elapsed_ms,
            "Request completed"
        ),
    }

    response
}
