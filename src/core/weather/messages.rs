//! Wire types for the Open-Meteo APIs.

use serde::{Deserialize, Serialize};

/// Temperature unit scale requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureScale {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "celsius",
            TemperatureScale::Fahrenheit => "fahrenheit",
        }
    }
}

/// Current conditions for a location, passed through to callers largely
/// unmodified (the shape the upstream API returns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub current: CurrentConditions,
    pub current_units: CurrentUnits,
}

/// Current temperature and wind speed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub temperature_2m: f64,
    pub wind_speed_10m: f64,
}

/// Unit labels matching [`CurrentConditions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUnits {
    pub temperature_2m: String,
    pub wind_speed_10m: String,
}

/// Geocoding search response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeocodingResponse {
    #[serde(default)]
    pub results: Vec<GeocodingMatch>,
}

/// One geocoding match.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeocodingMatch {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scale_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_value(TemperatureScale::Celsius).unwrap(),
            json!("celsius")
        );
        let scale: TemperatureScale = serde_json::from_value(json!("fahrenheit")).unwrap();
        assert_eq!(scale, TemperatureScale::Fahrenheit);
    }

    #[test]
    fn test_scale_defaults_to_celsius() {
        assert_eq!(TemperatureScale::default(), TemperatureScale::Celsius);
    }

    #[test]
    fn test_weather_result_roundtrip_keeps_api_shape() {
        let payload = json!({
            "current": {
                "time": "2025-05-01T12:00",
                "temperature_2m": 21.4,
                "wind_speed_10m": 11.3,
                "interval": 900
            },
            "current_units": {
                "temperature_2m": "°C",
                "wind_speed_10m": "km/h"
            }
        });

        let result: WeatherResult = serde_json::from_value(payload).unwrap();
        assert_eq!(result.current.temperature_2m, 21.4);
        assert_eq!(result.current_units.wind_speed_10m, "km/h");

        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back["current"]["temperature_2m"], json!(21.4));
        assert_eq!(back["current_units"]["temperature_2m"], json!("°C"));
    }

    #[test]
    fn test_geocoding_response_tolerates_missing_results() {
        let parsed: GeocodingResponse =
            serde_json::from_value(json!({"generationtime_ms": 0.5})).unwrap();
        assert!(parsed.results.is_empty());
    }
}
