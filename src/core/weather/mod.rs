//! Weather lookup client.
//!
//! A thin HTTP client over the Open-Meteo APIs: the free-text location is
//! resolved to coordinates through the geocoding endpoint, then current
//! conditions (temperature and wind speed, with unit labels) are fetched from
//! the forecast endpoint. Both the call handler and the MCP tool server go
//! through this client, and both must be able to catch every failure it can
//! produce.

mod client;
mod config;
mod messages;

pub use client::{WeatherClient, WeatherError};
pub use config::WeatherConfig;
pub use messages::{CurrentConditions, CurrentUnits, TemperatureScale, WeatherResult};
