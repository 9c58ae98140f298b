use async_trait::async_trait;
use reqwest::{Client, Request, Url};
use serde_json::Value;

use crate::{
    config::ApiSettings,
    error::WeatherError,
    model::{GeoCodeQuery, LocationSearchQuery, QueryParams, WeatherQuery},
};

use super::{Endpoint, WeatherApi};

const API_KEY_PARAM: &str = "appid";

/// OpenWeather REST client. Every call is exactly one GET; nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    settings: ApiSettings,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(settings: ApiSettings) -> Self {
        Self::with_http_client(settings, Client::new())
    }

    pub fn with_http_client(settings: ApiSettings, http: Client) -> Self {
        Self { settings, http }
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        let base = self.settings.base_url.trim_end_matches('/');
        format!("{base}{}", endpoint.path())
    }

    /// Build the GET request for `endpoint` without sending it.
    ///
    /// Query parameters come first in field order, followed by the API key.
    pub fn build_request<Q>(&self, endpoint: Endpoint, query: &Q) -> Result<Request, WeatherError>
    where
        Q: QueryParams + ?Sized,
    {
        let request = self
            .http
            .get(self.endpoint_url(endpoint))
            .query(&query.params())
            .query(&[(API_KEY_PARAM, self.settings.api_key.as_str())])
            .build()?;

        Ok(request)
    }

    async fn fetch<Q>(&self, endpoint: Endpoint, query: &Q) -> Result<Value, WeatherError>
    where
        Q: QueryParams + Sync + ?Sized,
    {
        let request = self.build_request(endpoint, query)?;
        tracing::debug!(%endpoint, url = %redacted(request.url()), "Sending provider request");

        let res = self.http.execute(request).await?;

        let status = res.status();
        let body = res.text().await?;
        tracing::debug!(%endpoint, %status, bytes = body.len(), "Provider responded");

        if !status.is_success() {
            tracing::warn!(%endpoint, %status, "Provider request failed");
            return Err(WeatherError::Upstream {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherClient {
    fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    async fn search_location(&self, query: &LocationSearchQuery) -> Result<Value, WeatherError> {
        self.fetch(Endpoint::Find, query).await
    }

    async fn get_current_weather(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        self.fetch(Endpoint::CurrentWeather, query).await
    }

    async fn reverse_geocode(&self, query: &GeoCodeQuery) -> Result<Value, WeatherError> {
        self.fetch(Endpoint::ReverseGeocode, query).await
    }
}

/// Render a request URL for logs with the API key masked.
fn redacted(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == API_KEY_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut url = url.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
