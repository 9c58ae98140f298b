//! Core library for the `skycast` weather lookup app.
//!
//! This crate defines:
//! - Query types and unit/severity enumerations
//! - A thin client over the weather provider's REST endpoints
//! - A shared locale/timezone-aware date formatter
//! - Configuration loading (file + environment)
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dates;
pub mod error;
pub mod model;
pub mod provider;

pub use config::{ApiSettings, Config, DisplayConfig};
pub use dates::{DateFormatter, LocalizedFormat};
pub use error::{DateError, WeatherError};
pub use model::{
    GeoCodeQuery, LocationSearchQuery, MessageSeverity, QueryParams, UnitSystem, WeatherQuery,
};
pub use provider::{Endpoint, WeatherApi, client_from_config, openweather::OpenWeatherClient};
