use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::LocationSource;
use crate::entities::coordinates::Coordinates;
use crate::error::{AppError, AppResult, LocationError};

/// Failure reported by a position source, using the W3C geolocation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionError(pub u16);

impl PositionError {
    pub const PERMISSION_DENIED: PositionError = PositionError(1);
    pub const POSITION_UNAVAILABLE: PositionError = PositionError(2);
    pub const TIMEOUT: PositionError = PositionError(3);
}

impl From<PositionError> for LocationError {
    fn from(error: PositionError) -> Self {
        match error {
            PositionError::PERMISSION_DENIED => LocationError::PermissionDenied,
            PositionError::POSITION_UNAVAILABLE => LocationError::Unavailable,
            PositionError::TIMEOUT => LocationError::Timeout,
            _ => LocationError::Unknown,
        }
    }
}

/// A single-shot source of the customer's current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, PositionError>;
}

/// Answers with a preconfigured position, or "unavailable" when none is set.
pub struct FixedLocationProvider {
    position: Option<Coordinates>,
}

impl FixedLocationProvider {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        self.position.ok_or(PositionError::POSITION_UNAVAILABLE)
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Resolves the position through an HTTP lookup service.
pub struct HttpLocationProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpLocationProvider {
    pub fn new(url: String, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build location client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl LocationProvider for HttpLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            tracing::debug!(error = %e, "Location lookup failed");
            if e.is_timeout() {
                PositionError::TIMEOUT
            } else if e.is_connect() {
                PositionError::POSITION_UNAVAILABLE
            } else {
                PositionError(0)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PositionError::PERMISSION_DENIED);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PositionError::POSITION_UNAVAILABLE);
        }
        if !status.is_success() {
            return Err(PositionError(0));
        }

        let body: LookupResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                PositionError::TIMEOUT
            } else {
                PositionError(0)
            }
        })?;

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates::new(latitude, longitude)),
            _ => Err(PositionError::POSITION_UNAVAILABLE),
        }
    }
}

pub fn build_provider(source: &LocationSource) -> AppResult<Arc<dyn LocationProvider>> {
    match source {
        LocationSource::Fixed(position) => Ok(Arc::new(FixedLocationProvider::new(*position))),
        LocationSource::Http { url, timeout_secs } => Ok(Arc::new(HttpLocationProvider::new(
            url.clone(),
            Duration::from_secs(*timeout_secs),
        )?)),
    }
}

/// Acquisition state as seen by consumers. The three fields always change
/// together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSnapshot {
    pub loading: bool,
    pub coordinates: Option<Coordinates>,
    pub error: Option<LocationError>,
    #[serde(skip)]
    generation: u64,
}

impl LocationSnapshot {
    pub fn loading() -> Self {
        Self {
            loading: true,
            coordinates: None,
            error: None,
            generation: 0,
        }
    }

    pub fn resolved(coordinates: Coordinates) -> Self {
        Self {
            loading: false,
            coordinates: Some(coordinates),
            error: None,
            generation: 0,
        }
    }

    pub fn failed(error: LocationError) -> Self {
        Self {
            loading: false,
            coordinates: None,
            error: Some(error),
            generation: 0,
        }
    }

    /// Not loading, no position and no error. Unreachable through
    /// [`LocationService`] but representable.
    pub fn idle() -> Self {
        Self {
            loading: false,
            coordinates: None,
            error: None,
            generation: 0,
        }
    }

    /// Which acquisition this snapshot belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns the acquisition state for the process and the source it asks.
pub struct LocationService {
    provider: Arc<dyn LocationProvider>,
    state: watch::Sender<LocationSnapshot>,
}

impl LocationService {
    /// Starts in the loading state; call [`spawn_request`](Self::spawn_request)
    /// once at start-up.
    pub fn new(provider: Arc<dyn LocationProvider>) -> Self {
        let (state, _) = watch::channel(LocationSnapshot::loading());
        Self { provider, state }
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationSnapshot> {
        self.state.subscribe()
    }

    /// Acquire the position and wait for the outcome. Returns the state after
    /// this request settled, which may belong to a newer request.
    pub async fn request_location(&self) -> LocationSnapshot {
        let generation = self.begin();
        let outcome = self.provider.current_position().await;
        self.complete(generation, outcome)
    }

    /// Same as [`request_location`](Self::request_location) but runs in the
    /// background. The loading transition happens before this returns.
    pub fn spawn_request(self: &Arc<Self>) -> JoinHandle<LocationSnapshot> {
        let generation = self.begin();
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = service.provider.current_position().await;
            service.complete(generation, outcome)
        })
    }

    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.loading = true;
            state.error = None;
            generation = state.generation;
        });
        tracing::debug!(generation, "Location requested");
        generation
    }

    fn complete(&self, generation: u64, outcome: Result<Coordinates, PositionError>) -> LocationSnapshot {
        let applied = self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            match outcome {
                Ok(coordinates) => {
                    state.coordinates = Some(coordinates);
                    state.error = None;
                }
                Err(code) => {
                    state.coordinates = None;
                    state.error = Some(code.into());
                }
            }
            state.loading = false;
            true
        });

        if applied {
            match outcome {
                Ok(coordinates) => tracing::info!(
                    generation,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "Location resolved"
                ),
                Err(code) => tracing::warn!(
                    generation,
                    code = code.0,
                    error = %LocationError::from(code),
                    "Location request failed"
                ),
            }
        } else {
            tracing::debug!(generation, "Discarding stale location response");
        }

        self.snapshot()
    }
}
