use std::net::SocketAddr;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_delivery_backend::{
    config::Config,
    middleware::rate_limit::{ip_governor, log_request},
    routes,
    services::location::build_provider,
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "food_delivery_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        restaurant_lat = config.delivery.restaurant_location.latitude,
        restaurant_lng = config.delivery.restaurant_location.longitude,
        flat_fee = config.delivery.flat_delivery_fee,
        max_distance_km = config.delivery.max_delivery_distance_km,
        "Delivery zone configured"
    );
    tracing::info!(
        per_minute = config.rate_limits.requests_per_minute,
        location_retries_per_minute = config.rate_limits.location_retries_per_minute,
        "Rate limits configured"
    );

    let provider = build_provider(&config.location).expect("Failed to set up location provider");
    let state = AppState::new(config.clone(), provider);

    // Acquire the position once at start-up; clients retry on demand
    state.location.spawn_request();

    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(ip_governor(config.rate_limits.requests_per_minute));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
