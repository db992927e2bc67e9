use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use food_delivery_backend::{
    config::{Config, LocationSource, RateLimits},
    entities::{coordinates::Coordinates, quote::DeliveryQuoteConfig, user::UserRole},
    routes::create_router,
    services::location::FixedLocationProvider,
    utils::geo::EARTH_RADIUS_KM,
    AppState,
};

const SECRET: &str = "test-secret";
const LAGOS: Coordinates = Coordinates::new(6.5244, 3.3792);

fn north_of_lagos(km: f64) -> Coordinates {
    Coordinates::new(LAGOS.latitude + (km / EARTH_RADIUS_KM).to_degrees(), LAGOS.longitude)
}

fn config(device: Option<Coordinates>) -> Config {
    Config {
        jwt_secret: SECRET.to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        delivery: DeliveryQuoteConfig {
            restaurant_location: LAGOS,
            flat_delivery_fee: 500,
            max_delivery_distance_km: 7.0,
        },
        location: LocationSource::Fixed(device),
        rate_limits: RateLimits { requests_per_minute: 100, location_retries_per_minute: 60 },
    }
}

/// App whose location has already been acquired once.
async fn app_at(device: Option<Coordinates>) -> Router {
    app_with(config(device)).await
}

async fn app_with(config: Config) -> Router {
    let device = match &config.location {
        LocationSource::Fixed(device) => *device,
        LocationSource::Http { .. } => None,
    };
    let state = AppState::new(config, Arc::new(FixedLocationProvider::new(device)));
    state.location.request_location().await;
    create_router(state)
}

/// Sessions are issued by the storefront's identity service; mint one the same way.
fn token(role: UserRole) -> String {
    let claims = json!({
        "sub": Uuid::new_v4(),
        "role": role,
        "exp": (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn jollof() -> Value {
    json!({ "id": "jollof", "name": "Jollof Rice", "price": 1000, "image_url": "https://img.example.com/jollof.jpg" })
}

#[tokio::test]
async fn cart_requires_a_token() {
    let app = app_at(Some(north_of_lagos(4.0))).await;

    let (status, _) = send(&app, Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_cart_has_no_fee() {
    let app = app_at(Some(north_of_lagos(4.0))).await;
    let customer = token(UserRole::Customer);

    let (status, body) = send(&app, Method::GET, "/api/cart", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subtotal"], 0);
    assert_eq!(body["delivery_fee"], 0);
    assert_eq!(body["total"], 0);
    assert_eq!(body["message"], Value::Null);
    assert_eq!(body["is_out_of_zone"], false);
}

#[tokio::test]
async fn in_zone_cart_is_charged_the_flat_fee() {
    let app = app_at(Some(north_of_lagos(4.0))).await;
    let customer = token(UserRole::Customer);

    send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;
    let (status, body) = send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["subtotal"], 2000);
    assert_eq!(body["delivery_fee"], 500);
    assert_eq!(body["total"], 2500);
    assert_eq!(body["is_out_of_zone"], false);
    assert!(body["message"].as_str().unwrap().contains("4.0km"));
}

#[tokio::test]
async fn quantity_updates_and_removal() {
    let app = app_at(Some(north_of_lagos(4.0))).await;
    let customer = token(UserRole::Customer);

    send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;
    let (_, body) = send(
        &app,
        Method::PUT,
        "/api/cart/items/jollof",
        Some(&customer),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(body["subtotal"], 3000);
    assert_eq!(body["total"], 3500);

    let (status, _) = send(&app, Method::DELETE, "/api/cart/items/suya", Some(&customer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::DELETE, "/api/cart/items/jollof", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subtotal"], 0);
    assert_eq!(body["delivery_fee"], 0);
}

#[tokio::test]
async fn out_of_zone_blocks_checkout() {
    let app = app_at(Some(north_of_lagos(9.2))).await;
    let customer = token(UserRole::Customer);

    let (_, body) = send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;
    assert_eq!(body["is_out_of_zone"], true);
    assert_eq!(body["delivery_fee"], 0);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("9.2km") && message.contains("outside"));

    let details = json!({ "name": "Ada Obi", "phone": "08031234567", "address": "Ikorodu" });
    let (status, body) = send(&app, Method::POST, "/api/checkout", Some(&customer), Some(details)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("outside"));
}

#[tokio::test]
async fn unknown_location_applies_base_fee() {
    let app = app_at(None).await;
    let customer = token(UserRole::Customer);

    let (_, location) = send(&app, Method::GET, "/api/location", None, None).await;
    assert_eq!(location["loading"], false);
    assert_eq!(location["error"], "Location information is unavailable.");

    let (_, body) = send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;
    assert_eq!(body["delivery_fee"], 500);
    assert_eq!(body["total"], 1500);
    assert_eq!(
        body["message"],
        "Could not determine your location. A base delivery fee will be applied. \
         Error: Location information is unavailable."
    );
}

#[tokio::test]
async fn staff_cart_is_disabled() {
    let app = app_at(Some(north_of_lagos(4.0))).await;

    for role in [UserRole::Admin, UserRole::SuperAdmin] {
        let staff = token(role);
        let (status, body) = send(&app, Method::POST, "/api/cart/items", Some(&staff), Some(jollof())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_items"], 0);
        assert_eq!(body["total"], 0);
        assert_eq!(body["message"], "Cart is disabled for administrators.");

        let (status, _) = send(&app, Method::POST, "/api/checkout", Some(&staff), Some(json!({}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn checkout_validates_and_prices_order() {
    let app = app_at(Some(north_of_lagos(4.0))).await;
    let customer = token(UserRole::Customer);

    send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;
    send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;

    let bad = json!({ "name": "Ada Obi", "phone": "12345", "address": "" });
    let (status, body) = send(&app, Method::POST, "/api/checkout", Some(&customer), Some(bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["phone"], "Please enter a valid 11-digit phone number.");
    assert_eq!(body["fields"]["address"], "Delivery address is required.");

    let good = json!({ "name": "Ada Obi", "phone": "08031234567", "address": "12 Admiralty Way, Lekki" });
    let (status, body) = send(&app, Method::POST, "/api/checkout", Some(&customer), Some(good)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reference"].as_str().unwrap().starts_with("CX-"));
    assert_eq!(body["total"], 2500);
    assert_eq!(body["payment_amount_kobo"], 250_000);
    assert_eq!(body["status"], "Order Received");
}

#[tokio::test]
async fn location_retry_and_delivery_config() {
    let app = app_at(Some(north_of_lagos(4.0))).await;

    let (status, body) = send(&app, Method::POST, "/api/location/retry", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loading"], false);
    assert_eq!(body["error"], Value::Null);
    assert!(body["coordinates"]["latitude"].is_number());

    let (_, body) = send(&app, Method::GET, "/api/config/delivery", None, None).await;
    assert_eq!(body["flat_delivery_fee"], 500);
    assert_eq!(body["max_delivery_distance_km"], 7.0);
}

#[tokio::test]
async fn sign_in_is_disabled() {
    let app = app_at(None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter22" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Login functionality is currently disabled.");
}

#[tokio::test]
async fn oversized_price_is_rejected_without_touching_the_cart() {
    let app = app_at(Some(north_of_lagos(4.0))).await;
    let customer = token(UserRole::Customer);

    let gold = json!({ "id": "gold", "name": "Gold Platter", "price": u64::MAX });
    let (status, body) = send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(gold)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Cart total cannot exceed"));

    let (status, body) = send(&app, Method::GET, "/api/cart", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subtotal"], 0);
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn huge_quantity_is_rejected_without_touching_the_cart() {
    let app = app_at(Some(north_of_lagos(4.0))).await;
    let customer = token(UserRole::Customer);

    send(&app, Method::POST, "/api/cart/items", Some(&customer), Some(jollof())).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/cart/items/jollof",
        Some(&customer),
        Some(json!({ "quantity": u32::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/api/cart", Some(&customer), None).await;
    assert_eq!(body["items"][0]["quantity"], 1);
    assert_eq!(body["total"], 1500);
}

#[tokio::test]
async fn order_history_is_empty_and_lookups_miss() {
    let app = app_at(None).await;
    let customer = token(UserRole::Customer);

    let (status, body) = send(&app, Method::GET, "/api/orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::GET, "/api/orders/CX-7Q2M9ZK4D", Some(&customer), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Order not found");

    let (status, _) = send(&app, Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/api/orders", Some(&token(UserRole::Admin)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_status_updates_are_disabled_for_staff() {
    let app = app_at(None).await;

    for status in ["Order Received", "Preparing Your Meal", "Out for Delivery", "Delivered", "Cancelled"] {
        let (code, body) = send(
            &app,
            Method::PUT,
            "/api/orders/CX-7Q2M9ZK4D/status",
            Some(&token(UserRole::SuperAdmin)),
            Some(json!({ "status": status })),
        )
        .await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE, "{status}");
        assert_eq!(body["error"], "Order status update functionality is disabled.");
    }

    let (code, _) = send(
        &app,
        Method::PUT,
        "/api/orders/CX-7Q2M9ZK4D/status",
        Some(&token(UserRole::Admin)),
        Some(json!({ "status": "Shipped" })),
    )
    .await;
    assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);

    let (code, _) = send(
        &app,
        Method::PUT,
        "/api/orders/CX-7Q2M9ZK4D/status",
        Some(&token(UserRole::Customer)),
        Some(json!({ "status": "Delivered" })),
    )
    .await;
    assert_eq!(code, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn menu_is_empty() {
    let app = app_at(None).await;

    let (status, body) = send(&app, Method::GET, "/api/menu", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn location_retries_are_limited_across_clients() {
    let mut limited = config(Some(north_of_lagos(4.0)));
    limited.rate_limits.location_retries_per_minute = 1;
    let app = app_with(limited).await;

    let (status, _) = send(&app, Method::POST, "/api/location/retry", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/api/location/retry", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].as_str().unwrap().starts_with("Too many requests"));

    let (status, _) = send(&app, Method::GET, "/api/location", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
