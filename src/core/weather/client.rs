//! Weather client implementation.
//!
//! Two sequential HTTP calls per lookup:
//!
//! 1. `GET {geocoding}/v1/search?name={location}&count=1` resolves the
//!    free-text location to coordinates.
//! 2. `GET {forecast}/v1/forecast?latitude=..&longitude=..&current=temperature_2m,wind_speed_10m`
//!    fetches current conditions, with `temperature_unit=fahrenheit` appended
//!    when the caller asked for fahrenheit.
//!
//! No retries: a failed lookup is returned to the caller, which decides how
//! to degrade (the call handler substitutes a fixed apology, the tool server
//! returns an error content block).

use reqwest::StatusCode;
use tracing::debug;

use super::config::WeatherConfig;
use super::messages::{GeocodingMatch, GeocodingResponse, TemperatureScale, WeatherResult};

/// Errors produced by a weather lookup.
///
/// Every variant is recoverable by callers; nothing in this module panics.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API answered with a non-success status.
    #[error("weather API returned status {status}")]
    Status { status: StatusCode },

    /// The geocoding search produced no match for the location.
    #[error("no geocoding match for location '{0}'")]
    LocationNotFound(String),
}

/// HTTP client for weather lookups.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    /// Create a client with the given endpoints and timeout.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Look up current conditions for a free-text location.
    pub async fn get_weather(
        &self,
        location: &str,
        scale: TemperatureScale,
    ) -> Result<WeatherResult, WeatherError> {
        let place = self.geocode(location).await?;
        debug!(
            location,
            resolved = place.name.as_deref(),
            latitude = place.latitude,
            longitude = place.longitude,
            "resolved location"
        );

        let url = format!("{}/v1/forecast", self.config.forecast_url);
        let mut query = vec![
            ("latitude", place.latitude.to_string()),
            ("longitude", place.longitude.to_string()),
            ("current", "temperature_2m,wind_speed_10m".to_string()),
        ];
        if scale == TemperatureScale::Fahrenheit {
            query.push(("temperature_unit", scale.as_str().to_string()));
        }

        let response = self.http.get(&url).query(&query).send().await?;
        if !response.status().is_success() {
            return Err(WeatherError::Status {
                status: response.status(),
            });
        }

        Ok(response.json::<WeatherResult>().await?)
    }

    /// Resolve a location name to its best geocoding match.
    async fn geocode(&self, location: &str) -> Result<GeocodingMatch, WeatherError> {
        let url = format!("{}/v1/search", self.config.geocoding_url);
        let response = self
            .http
            .get(&url)
            .query(&[("name", location), ("count", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status {
                status: response.status(),
            });
        }

        let parsed = response.json::<GeocodingResponse>().await?;
        parsed
            .results
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))
    }
}
