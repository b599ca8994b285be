//! Weather client configuration.

use std::time::Duration;

/// Public Open-Meteo geocoding endpoint.
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

/// Public Open-Meteo forecast endpoint.
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

/// Default per-request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Endpoints and timeout for the weather client.
///
/// The base URLs are configurable so tests can point the client at a mock
/// server; production deployments use the public Open-Meteo endpoints.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Base URL of the geocoding API (no trailing slash).
    pub geocoding_url: String,
    /// Base URL of the forecast API (no trailing slash).
    pub forecast_url: String,
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl WeatherConfig {
    /// Config pointing both endpoints at one base URL. Used by tests.
    pub fn with_base_url(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            geocoding_url: base.clone(),
            forecast_url: base,
            ..Self::default()
        }
    }
}
