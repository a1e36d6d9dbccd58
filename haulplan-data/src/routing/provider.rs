//! `RouteGeometryProvider` backed by OSRM's Route API.
//!
//! # Architecture
//!
//! [`RouteGeometryProvider`] is synchronous so the routing engine can be
//! embedded in synchronous callers. This provider bridges to async HTTP by
//! blocking on a Tokio runtime internally.
//!
//! Availability is probed lazily and cached for
//! [`OsrmGeometryConfig::probe_interval`]. A transport failure during a
//! lookup marks the service unavailable until the next probe, so a
//! [`GeometrySelector`](haulplan_core::GeometrySelector) stops waiting on a
//! dead service after the first failure.

use std::future::Future;
use std::time::{Duration, Instant};

use haulplan_core::{GeometryError, Location, RouteGeometryProvider};
use parking_lot::Mutex;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::RouteResponse;

/// Error type for [`OsrmGeometryProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "haulplan-routing/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Default time an availability answer stays valid.
const DEFAULT_PROBE_INTERVAL_SECS: u64 = 30;

/// Configuration for [`OsrmGeometryProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsrmGeometryConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// OSRM routing profile.
    pub profile: String,
    /// How long an availability probe result is reused.
    pub probe_interval: Duration,
}

impl Default for OsrmGeometryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            profile: "driving".to_owned(),
            probe_interval: Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECS),
        }
    }
}

impl OsrmGeometryConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set how long availability answers are cached.
    #[must_use]
    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }
}

/// Route geometry provider using the OSRM Route API.
///
/// The provider owns a Tokio runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider uses its own runtime. Inside a
/// multi-threaded runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]) it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it
/// falls back to its own runtime, which blocks the caller's executor for
/// the duration of the request.
pub struct OsrmGeometryProvider {
    client: Client,
    config: OsrmGeometryConfig,
    runtime: Runtime,
    availability: Mutex<Option<(Instant, bool)>>,
}

impl std::fmt::Debug for OsrmGeometryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmGeometryProvider")
            .field("config", &self.config)
            .field("availability", &*self.availability.lock())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl OsrmGeometryProvider {
    /// Create a provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmGeometryConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmGeometryConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
            availability: Mutex::new(None),
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &OsrmGeometryConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Build the Route API URL for `waypoints`.
    ///
    /// The URL format is
    /// `{base_url}/route/v1/{profile}/{coordinates}?overview=full&geometries=geojson`
    /// where coordinates are semicolon-separated `lon,lat` pairs.
    fn build_route_url(&self, waypoints: &[Location]) -> String {
        let coords = waypoints
            .iter()
            .map(|location| format!("{},{}", location.lon, location.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.base_url(),
            self.config.profile,
            coords
        )
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    async fn fetch_geometry_async(
        &self,
        waypoints: &[Location],
    ) -> Result<Vec<Location>, GeometryError> {
        let url = self.build_route_url(waypoints);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let body: RouteResponse = response.json().await.map_err(|err| GeometryError::Parse {
            message: err.to_string(),
        })?;
        convert_response(body)
    }

    /// Any HTTP answer from the base URL counts as available.
    async fn probe_async(&self) -> bool {
        self.client.get(self.base_url()).send().await.is_ok()
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> GeometryError {
        if error.is_timeout() {
            return GeometryError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return GeometryError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        GeometryError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    fn record_availability(&self, available: bool) {
        *self.availability.lock() = Some((Instant::now(), available));
    }
}

/// Convert an OSRM response into a polyline.
fn convert_response(response: RouteResponse) -> Result<Vec<Location>, GeometryError> {
    if !response.is_ok() {
        return Err(GeometryError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| GeometryError::Parse {
            message: "OSRM response contains no routes".to_owned(),
        })?;
    route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| {
            Location::new(lat, lon).map_err(|err| GeometryError::Parse {
                message: err.to_string(),
            })
        })
        .collect()
}

impl RouteGeometryProvider for OsrmGeometryProvider {
    fn is_available(&self) -> bool {
        let cached = *self.availability.lock();
        if let Some((checked, available)) = cached {
            if checked.elapsed() < self.config.probe_interval {
                return available;
            }
        }
        let available = self.block_on(self.probe_async());
        if !available {
            log::warn!("OSRM service at {} is unreachable", self.base_url());
        }
        self.record_availability(available);
        available
    }

    /// Fetch the road geometry through `waypoints`.
    ///
    /// A single waypoint is returned unchanged without a request.
    fn route_geometry(&self, waypoints: &[Location]) -> Result<Vec<Location>, GeometryError> {
        match waypoints {
            [] => return Err(GeometryError::EmptyInput),
            [only] => return Ok(vec![*only]),
            _ => {}
        }
        let result = self.block_on(self.fetch_geometry_async(waypoints));
        if matches!(
            result,
            Err(GeometryError::Network { .. } | GeometryError::Timeout { .. })
        ) {
            self.record_availability(false);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::osrm::{LineString, RouteEntry};
    use rstest::{fixture, rstest};

    #[fixture]
    fn waypoints() -> Vec<Location> {
        vec![
            Location {
                lat: 43.76,
                lon: -79.41,
            },
            Location {
                lat: 43.70,
                lon: -79.40,
            },
        ]
    }

    fn response(code: &str, coordinates: Option<Vec<[f64; 2]>>) -> RouteResponse {
        RouteResponse {
            code: code.to_owned(),
            message: None,
            routes: coordinates
                .map(|coordinates| {
                    vec![RouteEntry {
                        geometry: LineString { coordinates },
                    }]
                })
                .unwrap_or_default(),
        }
    }

    #[rstest]
    fn build_route_url_formats_coordinates(waypoints: Vec<Location>) {
        let provider =
            OsrmGeometryProvider::new("http://osrm.example.com").expect("provider should build");

        assert_eq!(
            provider.build_route_url(&waypoints),
            "http://osrm.example.com/route/v1/driving/-79.41,43.76;-79.4,43.7\
             ?overview=full&geometries=geojson"
        );
    }

    #[rstest]
    fn build_route_url_strips_trailing_slash_and_uses_profile(waypoints: Vec<Location>) {
        let config = OsrmGeometryConfig::new("http://osrm.example.com/").with_profile("truck");
        let provider = OsrmGeometryProvider::with_config(config).expect("provider should build");

        let url = provider.build_route_url(&waypoints);

        assert!(url.starts_with("http://osrm.example.com/route/v1/truck/"));
        assert!(!url.contains("//route"));
    }

    #[rstest]
    fn convert_response_swaps_coordinate_order() {
        let line = convert_response(response("Ok", Some(vec![[-79.41, 43.76], [-79.40, 43.70]])))
            .expect("should parse");

        assert_eq!(
            line,
            [
                Location {
                    lat: 43.76,
                    lon: -79.41
                },
                Location {
                    lat: 43.70,
                    lon: -79.40
                }
            ]
        );
    }

    #[rstest]
    fn convert_response_handles_service_error() {
        let err = convert_response(response("NoRoute", None)).expect_err("should fail");

        assert!(matches!(err, GeometryError::Service { code, .. } if code == "NoRoute"));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(vec![[200.0, 43.7]]))]
    fn convert_response_rejects_unusable_routes(#[case] coordinates: Option<Vec<[f64; 2]>>) {
        let err = convert_response(response("Ok", coordinates)).expect_err("should fail");

        assert!(matches!(err, GeometryError::Parse { .. }));
    }

    #[rstest]
    fn empty_input_returns_error() {
        let provider =
            OsrmGeometryProvider::new("http://localhost:5000").expect("provider should build");

        assert_eq!(provider.route_geometry(&[]), Err(GeometryError::EmptyInput));
    }

    #[rstest]
    fn single_waypoint_needs_no_request(waypoints: Vec<Location>) {
        let provider =
            OsrmGeometryProvider::new("http://192.0.2.1:5000").expect("provider should build");

        assert_eq!(provider.route_geometry(&waypoints[..1]), Ok(waypoints[..1].to_vec()));
    }

    #[rstest]
    fn cached_availability_is_reused() {
        let provider =
            OsrmGeometryProvider::new("http://192.0.2.1:5000").expect("provider should build");
        provider.record_availability(true);

        assert!(provider.is_available());
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = OsrmGeometryConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent/1.0")
            .with_probe_interval(Duration::from_secs(1));

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.profile, "driving");
        assert_eq!(config.probe_interval, Duration::from_secs(1));
    }
}
