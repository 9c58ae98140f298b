use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} '{value}'. Expected one of: {expected}.")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Measurement system the provider uses for values in its response.
///
/// `Standard` is the provider default (Kelvin, m/s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Standard,
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Standard => "standard",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[
            UnitSystem::Standard,
            UnitSystem::Metric,
            UnitSystem::Imperial,
        ]
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "standard" => Ok(UnitSystem::Standard),
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(UnknownVariant {
                kind: "unit system",
                value: value.to_string(),
                expected: "standard, metric, imperial",
            }),
        }
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSeverity {
    Error,
    Info,
    Warning,
}

impl MessageSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSeverity::Error => "error",
            MessageSeverity::Info => "info",
            MessageSeverity::Warning => "warning",
        }
    }

    pub const fn all() -> &'static [MessageSeverity] {
        &[
            MessageSeverity::Error,
            MessageSeverity::Info,
            MessageSeverity::Warning,
        ]
    }
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageSeverity {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "error" => Ok(MessageSeverity::Error),
            "info" => Ok(MessageSeverity::Info),
            "warning" => Ok(MessageSeverity::Warning),
            _ => Err(UnknownVariant {
                kind: "message severity",
                value: value.to_string(),
                expected: "error, info, warning",
            }),
        }
    }
}

/// Flattens a query into provider request parameters.
///
/// Absent optional fields produce no pair at all. The API key is added by the client,
/// never by the query.
pub trait QueryParams {
    fn params(&self) -> Vec<(&'static str, String)>;
}

/// Current-weather lookup by coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub lat: String,
    pub lon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitSystem>,
}

impl WeatherQuery {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            units: None,
        }
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = Some(units);
        self
    }
}

impl QueryParams for WeatherQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("lat", self.lat.clone()), ("lon", self.lon.clone())];
        if let Some(units) = self.units {
            params.push(("units", units.as_str().to_string()));
        }
        params
    }
}

/// Reverse-geocoding lookup: a [`WeatherQuery`] without units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCodeQuery {
    pub lat: String,
    pub lon: String,
}

impl GeoCodeQuery {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
        }
    }
}

impl From<WeatherQuery> for GeoCodeQuery {
    fn from(query: WeatherQuery) -> Self {
        Self {
            lat: query.lat,
            lon: query.lon,
        }
    }
}

impl From<&WeatherQuery> for GeoCodeQuery {
    fn from(query: &WeatherQuery) -> Self {
        Self {
            lat: query.lat.clone(),
            lon: query.lon.clone(),
        }
    }
}

impl QueryParams for GeoCodeQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![("lat", self.lat.clone()), ("lon", self.lon.clone())]
    }
}

/// Free-text place search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSearchQuery {
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitSystem>,
}

impl LocationSearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            limit: None,
            units: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = Some(units);
        self
    }
}

impl QueryParams for LocationSearchQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("q", self.q.clone())];
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(units) = self.units {
            params.push(("units", units.as_str().to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &[(&'static str, String)]) -> Vec<&'static str> {
        params.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn unit_system_as_str_roundtrip() {
        for units in UnitSystem::all() {
            let parsed: UnitSystem = units.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unit_system_parse_is_case_insensitive() {
        assert_eq!("METRIC".parse::<UnitSystem>(), Ok(UnitSystem::Metric));
    }

    #[test]
    fn unknown_unit_system_error() {
        let err = "kelvin".parse::<UnitSystem>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown unit system 'kelvin'"));
        assert!(msg.contains("standard, metric, imperial"));
    }

    #[test]
    fn message_severity_parse_and_display() {
        for severity in MessageSeverity::all() {
            let parsed: MessageSeverity = severity.to_string().parse().unwrap();
            assert_eq!(*severity, parsed);
        }
        assert!("fatal".parse::<MessageSeverity>().is_err());
    }

    #[test]
    fn weather_query_params_include_units_only_when_set() {
        let q = WeatherQuery::new("51.5", "-0.13");
        assert_eq!(keys(&q.params()), vec!["lat", "lon"]);

        let q = q.with_units(UnitSystem::Metric);
        assert_eq!(
            q.params(),
            vec![
                ("lat", "51.5".to_string()),
                ("lon", "-0.13".to_string()),
                ("units", "metric".to_string()),
            ]
        );
    }

    #[test]
    fn geocode_query_drops_units() {
        let weather = WeatherQuery::new("10", "20");
        let weather = weather.with_units(UnitSystem::Imperial);
        let geo = GeoCodeQuery::from(&weather);
        assert_eq!(geo, GeoCodeQuery::new("10", "20"));
        assert_eq!(keys(&geo.params()), vec!["lat", "lon"]);
    }

    #[test]
    fn search_query_params_follow_optional_fields() {
        let q = LocationSearchQuery::new("London");
        assert_eq!(q.params(), vec![("q", "London".to_string())]);

        let q = q.with_limit(5);
        assert_eq!(keys(&q.params()), vec!["q", "limit"]);

        let q = q.with_units(UnitSystem::Standard);
        assert_eq!(keys(&q.params()), vec!["q", "limit", "units"]);
    }

    #[test]
    fn serialized_queries_omit_absent_fields() {
        let json = serde_json::to_value(LocationSearchQuery::new("Paris")).unwrap();
        assert_eq!(json, serde_json::json!({ "q": "Paris" }));

        let query = WeatherQuery::new("1", "2").with_units(UnitSystem::Metric);
        let json = serde_json::to_value(query).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": "1", "lon": "2", "units": "metric" }));
    }

    #[test]
    fn deserialize_query_without_optionals() {
        let q: LocationSearchQuery = serde_json::from_str(r#"{"q":"Oslo"}"#).unwrap();
        assert_eq!(q, LocationSearchQuery::new("Oslo"));
    }
}
