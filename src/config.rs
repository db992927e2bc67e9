use std::env;

use crate::entities::coordinates::Coordinates;
use crate::entities::menu::MAX_CART_SUBTOTAL;
use crate::entities::quote::DeliveryQuoteConfig;

/// Where the service obtains the customer's current position from.
#[derive(Debug, Clone)]
pub enum LocationSource {
    /// A position pinned in the environment. `None` behaves like a device
    /// that cannot determine where it is.
    Fixed(Option<Coordinates>),
    /// A lookup endpoint answering with `{ "latitude": .., "longitude": .. }`.
    Http { url: String, timeout_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    /// Per client IP, across the whole API.
    pub requests_per_minute: u32,
    /// Across all clients, since every retry re-runs the shared acquisition.
    pub location_retries_per_minute: u32,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub delivery: DeliveryQuoteConfig,
    pub location: LocationSource,
    pub rate_limits: RateLimits,
}

impl Config {
    /// Load from the environment (and `.env`). Panics on anything the
    /// service cannot run with.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let delivery = DeliveryQuoteConfig {
            restaurant_location: Coordinates::new(
                parse_var("RESTAURANT_LAT", "6.5244"),
                parse_var("RESTAURANT_LNG", "3.3792"),
            ),
            flat_delivery_fee: parse_var("DELIVERY_FEE", "500"),
            max_delivery_distance_km: parse_var("MAX_DELIVERY_DISTANCE_KM", "7"),
        };
        check_delivery(&delivery).unwrap_or_else(|e| panic!("{}", e));

        let location = match env::var("LOCATION_PROVIDER")
            .unwrap_or_else(|_| "fixed".to_string())
            .as_str()
        {
            "http" => LocationSource::Http {
                url: env::var("LOCATION_LOOKUP_URL")
                    .expect("LOCATION_LOOKUP_URL must be set when LOCATION_PROVIDER=http"),
                timeout_secs: parse_var("LOCATION_TIMEOUT_SECS", "10"),
            },
            "fixed" => LocationSource::Fixed(
                device_position(env::var("DEVICE_LAT").ok(), env::var("DEVICE_LNG").ok())
                    .unwrap_or_else(|e| panic!("{}", e)),
            ),
            other => panic!("Unknown LOCATION_PROVIDER: {}", other),
        };

        let rate_limits = RateLimits {
            requests_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", "100"),
            location_retries_per_minute: parse_var("LOCATION_RETRIES_PER_MINUTE", "6"),
        };
        check_rate_limits(&rate_limits).unwrap_or_else(|e| panic!("{}", e));

        Self {
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: parse_var("SERVER_PORT", "3000"),
            delivery,
            location,
            rate_limits,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T>(key: &str, default: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|e| panic!("{} must be a number: {}", key, e))
}

fn check_delivery(delivery: &DeliveryQuoteConfig) -> Result<(), String> {
    if !delivery.restaurant_location.is_valid() {
        return Err(format!(
            "RESTAURANT_LAT/RESTAURANT_LNG out of range: {:?}",
            delivery.restaurant_location
        ));
    }
    let radius = delivery.max_delivery_distance_km;
    if !radius.is_finite() || radius <= 0.0 {
        return Err(format!(
            "MAX_DELIVERY_DISTANCE_KM must be a positive number of kilometers, got {}",
            radius
        ));
    }
    if delivery.flat_delivery_fee > MAX_CART_SUBTOTAL {
        return Err(format!(
            "DELIVERY_FEE must not exceed {}, got {}",
            MAX_CART_SUBTOTAL, delivery.flat_delivery_fee
        ));
    }
    Ok(())
}

fn device_position(lat: Option<String>, lng: Option<String>) -> Result<Option<Coordinates>, String> {
    let (lat, lng) = match (lat, lng) {
        (None, None) => return Ok(None),
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err("DEVICE_LAT and DEVICE_LNG must be set together".to_string()),
    };

    let position = Coordinates::new(
        lat.parse().map_err(|e| format!("DEVICE_LAT must be a number: {}", e))?,
        lng.parse().map_err(|e| format!("DEVICE_LNG must be a number: {}", e))?,
    );
    if !position.is_valid() {
        return Err(format!("DEVICE_LAT/DEVICE_LNG out of range: {:?}", position));
    }
    Ok(Some(position))
}

fn check_rate_limits(limits: &RateLimits) -> Result<(), String> {
    if limits.requests_per_minute == 0 || limits.location_retries_per_minute == 0 {
        return Err("Rate limits must be at least 1 per minute".to_string());
    }
    Ok(())
}
