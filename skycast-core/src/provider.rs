use crate::{
    Config, GeoCodeQuery, LocationSearchQuery, WeatherError, WeatherQuery,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Debug};

pub mod openweather;

/// Fixed provider endpoints, relative to the configured base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Find,
    CurrentWeather,
    ReverseGeocode,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Find => "/data/2.5/find",
            Endpoint::CurrentWeather => "/data/2.5/weather",
            Endpoint::ReverseGeocode => "/geo/1.0/reverse",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[
            Endpoint::Find,
            Endpoint::CurrentWeather,
            Endpoint::ReverseGeocode,
        ]
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Lookups against the weather provider.
///
/// Response bodies are returned exactly as decoded. Failures propagate unchanged.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    fn base_url(&self) -> &str;

    async fn search_location(&self, query: &LocationSearchQuery) -> Result<Value, WeatherError>;

    async fn get_current_weather(&self, query: &WeatherQuery) -> Result<Value, WeatherError>;

    async fn reverse_geocode(&self, query: &GeoCodeQuery) -> Result<Value, WeatherError>;
}

/// Construct the provider client from resolved configuration.
pub fn client_from_config(config: &Config) -> Box<dyn WeatherApi> {
    Box::new(OpenWeatherClient::new(config.api_settings()))
}
