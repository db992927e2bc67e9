use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers::{auth, cart, checkout, location, menu, orders};
use crate::middleware::auth::{auth_middleware, require_customer, require_staff};
use crate::middleware::rate_limit::{retry_governor, session_governor};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let limits = state.config.rate_limits;

    // Sign-in endpoints exist but are switched off
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Location state, delivery settings and the menu
    let public_routes = Router::new()
        .route("/location", get(location::get_location))
        .route(
            "/location/retry",
            post(location::retry_location).layer(retry_governor(limits.location_retries_per_minute)),
        )
        .route("/config/delivery", get(location::delivery_config))
        .route("/menu", get(menu::list_menu));

    // Any signed-in user; staff get the disabled cart
    let cart_routes = Router::new()
        .route("/", get(cart::get_cart).delete(cart::clear_cart))
        .route("/items", post(cart::add_item))
        .route("/items/{id}", put(cart::update_quantity).delete(cart::remove_item))
        .layer(session_governor(limits.requests_per_minute))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Customers only
    let checkout_routes = Router::new()
        .route("/", post(checkout::checkout))
        .layer(middleware::from_fn(require_customer))
        .layer(session_governor(limits.requests_per_minute))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let customer_order_routes = Router::new()
        .route("/", get(orders::list_orders))
        .route("/{id}", get(orders::get_order))
        .layer(middleware::from_fn(require_customer));

    let staff_order_routes = Router::new()
        .route("/{id}/status", put(orders::update_order_status))
        .layer(middleware::from_fn(require_staff));

    let order_routes = customer_order_routes
        .merge(staff_order_routes)
        .layer(session_governor(limits.requests_per_minute))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes)
        .nest("/api/cart", cart_routes)
        .nest("/api/checkout", checkout_routes)
        .nest("/api/orders", order_routes)
        .with_state(state)
}
