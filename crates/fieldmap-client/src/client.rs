//! HTTP client for the fieldmap server.
//!
//! Wraps `reqwest` with typed responses. The locations endpoint returns a
//! bare JSON array; every other endpoint wraps its payload in the
//! `{ data, meta }` envelope, and failures arrive as `{ error, meta }`.

use std::time::Duration;

use fieldmap_core::{CarrierSelector, LocationDto, LocationFilter};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;

/// Map-provider settings served by `GET /api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub map_provider_key: Option<String>,
    #[serde(default)]
    pub has_map_provider_key: bool,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeletedData {
    deleted: bool,
}

/// Client for one fieldmap server.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct MapClient {
    client: Client,
    base_url: Url,
}

impl MapClient {
    /// Creates a client for the server rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("fieldmap/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches locations matching `filter`, in store order.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the server rejects the query or the store
    ///   is unavailable.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a location array.
    pub async fn fetch_locations(
        &self,
        filter: &LocationFilter,
    ) -> Result<Vec<LocationDto>, ClientError> {
        let url = self.endpoint("api/locations")?;
        let params = query_params(filter);
        let response = self.client.get(url.clone()).query(&params).send().await?;
        decode(response, url.as_str()).await
    }

    /// Fetches map-provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on any transport, status, or decoding failure.
    /// Callers that can render without a provider key should prefer
    /// [`MapClient::fetch_config_or_default`].
    pub async fn fetch_config(&self) -> Result<MapConfig, ClientError> {
        let url = self.endpoint("api/config")?;
        let response = self.client.get(url.clone()).send().await?;
        let envelope: Envelope<MapConfig> = decode(response, url.as_str()).await?;
        Ok(envelope.data)
    }

    /// Like [`MapClient::fetch_config`], but a failure degrades to "no
    /// provider key" instead of aborting.
    pub async fn fetch_config_or_default(&self) -> MapConfig {
        match self.fetch_config().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "config fetch failed; continuing without map provider key");
                MapConfig::default()
            }
        }
    }

    /// Deletes one stored location. Returns `false` when the server has no
    /// location with that id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, on any error status
    /// other than 404, or if the body cannot be decoded.
    pub async fn delete_location(&self, id: &str) -> Result<bool, ClientError> {
        let url = self.location_url(id)?;
        let response = self.client.delete(url.clone()).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let envelope: Envelope<DeletedData> = decode(response, url.as_str()).await?;
        Ok(envelope.data.deleted)
    }

    /// `api/locations/{id}` with `id` pushed as a single percent-encoded
    /// segment, so ids containing `/` or `..` cannot reach other routes.
    fn location_url(&self, id: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("api/locations")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot have path segments".to_owned(),
            })?
            .push(id);
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }
}

/// Query-string pairs for a filter. `All` and absent bounds are omitted.
fn query_params(filter: &LocationFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let CarrierSelector::Only(carrier) = filter.carrier {
        params.push(("carrier", carrier.as_str().to_owned()));
    }
    if let Some(bounds) = filter.bounds {
        params.push(("north", bounds.north().to_string()));
        params.push(("south", bounds.south().to_string()));
        params.push(("east", bounds.east().to_string()));
        params.push(("west", bounds.west().to_string()));
    }
    params
}

async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let (code, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => (envelope.error.code, envelope.error.message),
            Err(_) => ("unknown".to_owned(), body),
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            code,
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use fieldmap_core::{Carrier, ViewportBounds};

    use super::*;

    #[test]
    fn base_url_gains_single_trailing_slash() {
        let client = MapClient::with_base_url("http://localhost:8070///", 5).expect("client");
        assert_eq!(client.base_url().as_str(), "http://localhost:8070/");
        assert_eq!(
            client.endpoint("api/locations").expect("endpoint").as_str(),
            "http://localhost:8070/api/locations"
        );
    }

    #[test]
    fn base_url_with_path_prefix_is_preserved() {
        let client = MapClient::with_base_url("http://gateway/fieldmap", 5).expect("client");
        assert_eq!(
            client.endpoint("api/config").expect("endpoint").as_str(),
            "http://gateway/fieldmap/api/config"
        );
    }

    #[test]
    fn location_ids_stay_inside_the_locations_path() {
        let client = MapClient::with_base_url("http://gateway/fieldmap", 5).expect("client");
        assert_eq!(
            client.location_url("42").expect("url").as_str(),
            "http://gateway/fieldmap/api/locations/42"
        );
        assert_eq!(
            client.location_url("../config").expect("url").as_str(),
            "http://gateway/fieldmap/api/locations/..%2Fconfig"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = MapClient::with_base_url("not a url", 5).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }), "{err:?}");
    }

    #[test]
    fn default_filter_sends_no_params() {
        assert!(query_params(&LocationFilter::default()).is_empty());
    }

    #[test]
    fn filter_params_carry_carrier_and_bounds() {
        let bounds = ViewportBounds::new(7.0, 6.0, 80.0, 79.5).expect("bounds");
        let filter = LocationFilter::new(Some(bounds), CarrierSelector::Only(Carrier::Etisalat));
        assert_eq!(
            query_params(&filter),
            vec![
                ("carrier", "Etisalat".to_owned()),
                ("north", "7".to_owned()),
                ("south", "6".to_owned()),
                ("east", "80".to_owned()),
                ("west", "79.5".to_owned()),
            ]
        );
    }
}
