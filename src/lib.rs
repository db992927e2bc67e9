pub mod config;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, AppResult};

use services::cart::CartStore;
use services::location::{LocationProvider, LocationService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub carts: Arc<CartStore>,
    pub location: Arc<LocationService>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            config,
            carts: Arc::new(CartStore::new()),
            location: Arc::new(LocationService::new(provider)),
        }
    }
}
