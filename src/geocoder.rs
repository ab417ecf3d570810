//! Remote geocoding services used when a country is not in the static table.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::Value;

use crate::Coordinates;

#[derive(Debug)]
pub enum Error {
    /// The request could not be sent or retried
    Request(reqwest_middleware::Error),
    /// The response body could not be read
    Http(reqwest::Error),
    /// The response body is not JSON
    Parse(serde_json::Error),
    /// The service URL cannot be extended with a country name
    Url(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(e) => std::fmt::Display::fmt(&e, f),
            Self::Http(e) => std::fmt::Display::fmt(&e, f),
            Self::Parse(e) => std::fmt::Display::fmt(&e, f),
            Self::Url(e) => write!(f, "invalid service url: {e}"),
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(value: reqwest_middleware::Error) -> Self {
        Self::Request(value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// An object that can turn a country name into [`Coordinates`].
#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// A human-readable name of the service, used in logs
    fn name(&self) -> &str;

    /// Returns the coordinates of `country`.
    /// `Ok(None)` means the service answered without usable coordinates.
    async fn lookup(&self, country: &str) -> Result<Option<Coordinates>, Error>;
}

/// Where the country name goes in the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePlacement {
    /// As a query parameter with this name, e.g. `?q=Denmark`
    Query(String),
    /// As the last path segment, e.g. `/Denmark`
    Path,
}

/// Settings shared by every [`HttpService`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    /// Timeout of a single request
    pub timeout: Duration,
    /// Number of retries on transient failures
    pub max_retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

/// A [`GeocodingService`] over HTTP GET returning JSON
pub struct HttpService {
    name: String,
    url: Url,
    placement: NamePlacement,
    params: Vec<(String, String)>,
    client: ClientWithMiddleware,
}

impl HttpService {
    pub fn new(
        name: &str,
        url: &str,
        placement: NamePlacement,
        params: &[(&str, &str)],
        config: ServiceConfig,
    ) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::Url(format!("{url}: {e}")))?;

        // Retry up to `max_retries` times with increasing intervals between attempts.
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            name: name.to_string(),
            url,
            placement,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            client,
        })
    }

    fn url(&self, country: &str) -> Result<Url, Error> {
        let mut url = self.url.clone();
        if self.placement == NamePlacement::Path {
            url.path_segments_mut()
                .map_err(|_| Error::Url(format!("{} cannot have a path", self.url)))?
                .pop_if_empty()
                .push(country);
        }
        Ok(url)
    }
}

#[async_trait]
impl GeocodingService for HttpService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, country: &str) -> Result<Option<Coordinates>, Error> {
        let mut request = self
            .client
            .get(self.url(country)?)
            .header(header::ACCEPT, "application/json")
            .query(&self.params);
        if let NamePlacement::Query(key) = &self.placement {
            request = request.query(&[(key.as_str(), country)]);
        }

        let response = request.send().await?;
        if !answered(response.status()) {
            log::debug!("{} - {country} - status {}", self.name, response.status());
            return Ok(None);
        }
        let data = response.bytes().await?;
        Ok(parse(&data)?)
    }
}

/// Whether a response with `status` may carry coordinates
fn answered(status: StatusCode) -> bool {
    status.is_success()
}

/// Returns the services of the reference deployment, in priority order.
pub fn default_services(config: ServiceConfig) -> Result<Vec<HttpService>, Error> {
    Ok(vec![
        HttpService::new(
            "geocoding.com",
            "https://api.geocoding.com/v1/search",
            NamePlacement::Query("q".to_string()),
            &[("limit", "1")],
            config,
        )?,
        HttpService::new(
            "geocode.xyz",
            "https://geocode.xyz/",
            NamePlacement::Path,
            &[("json", "1"), ("limit", "1")],
            config,
        )?,
    ])
}

/// Parses a numeric JSON value, accepting numbers encoded as strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Returns the coordinates of a feature collection, whose points are `[longitude, latitude]`.
fn from_features(value: &Value) -> Option<Option<Coordinates>> {
    let feature = value.get("features")?.as_array()?.first()?;
    let point = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(|c| c.as_array());
    Some(point.and_then(|point| {
        let longitude = number(point.first()?)?;
        let latitude = number(point.get(1)?)?;
        Coordinates::checked(latitude, longitude)
    }))
}

/// Returns the coordinates of a flat `{"lat": .., "lng": ..}` object.
/// The `latt`/`longt` and `lon` spellings are also accepted.
fn from_flat(value: &Value) -> Option<Option<Coordinates>> {
    let latitude = ["lat", "latt", "latitude"]
        .iter()
        .find_map(|key| value.get(*key))?;
    let longitude = ["lng", "lon", "longt", "longitude"]
        .iter()
        .find_map(|key| value.get(*key))?;
    Some(
        number(latitude)
            .zip(number(longitude))
            .and_then(|(lat, lon)| Coordinates::checked(lat, lon)),
    )
}

/// Parses the body of a geocoding response.
/// Returns `Ok(None)` when the body has no usable coordinates, including when any
/// of them is zero.
pub fn parse(data: &[u8]) -> Result<Option<Coordinates>, serde_json::Error> {
    let value = serde_json::from_slice::<Value>(data)?;
    Ok(from_features(&value)
        .or_else(|| from_flat(&value))
        .flatten())
}
