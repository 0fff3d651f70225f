//! HTTP client for the nearby-places provider.
//!
//! Wraps `reqwest` with provider-specific error handling, credential
//! management, and typed response deserialization. Every response's
//! `status`/`error_message` envelope fields are checked and surfaced as
//! [`PlacesError::Api`].

use std::time::Duration;

use reqwest::{Client, Url};

use placescout_core::{CandidateSource, Coordinate, Place};

use crate::error::PlacesError;
use crate::normalize::normalize_record;
use crate::types::{NearbySearchResponse, PlaceRecord};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Provider search type used when the request carries no category filter.
const DEFAULT_CATEGORY: &str = "point_of_interest";

/// Client for the nearby-places provider.
///
/// Manages the HTTP client, API credential, and base URL. Use
/// [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl PlacesClient {
    /// Creates a new client pointed at the production provider endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("placescout/0.1 (activity-finder)")
            .build()?;

        // Normalise: the base URL must end with exactly one slash so that
        // Url::join appends the endpoint path instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| PlacesError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Issues one nearby-search lookup and returns the raw provider records.
    ///
    /// A `ZERO_RESULTS` status is an empty list, not a fault; the caller's
    /// radius-expansion policy decides what to do with emptiness.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the provider reports an error payload.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected shape.
    pub async fn nearby_search(
        &self,
        origin: Coordinate,
        radius_meters: f64,
        category: Option<&str>,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        let url = self.nearby_search_url(origin, radius_meters, category)?;
        tracing::debug!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            radius_meters,
            category = category.unwrap_or(DEFAULT_CATEGORY),
            "nearby search"
        );

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let parsed: NearbySearchResponse =
            serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
                context: "nearbysearch/json".to_owned(),
                source: e,
            })?;

        if let Some(message) = parsed.error_message {
            return Err(PlacesError::Api(message));
        }
        match parsed.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(parsed.results),
            other => Err(PlacesError::Api(format!("provider status {other}"))),
        }
    }

    /// Builds the nearby-search URL with properly percent-encoded query
    /// parameters. The provider expects the radius in whole meters.
    fn nearby_search_url(
        &self,
        origin: Coordinate,
        radius_meters: f64,
        category: Option<&str>,
    ) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join("nearbysearch/json")
            .map_err(|e| PlacesError::Api(format!("invalid endpoint path: {e}")))?;

        #[allow(clippy::cast_possible_truncation)]
        let radius = radius_meters.round() as i64;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(
                "location",
                &format!("{},{}", origin.latitude, origin.longitude),
            );
            pairs.append_pair("radius", &radius.to_string());
            pairs.append_pair("type", category.unwrap_or(DEFAULT_CATEGORY));
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

impl CandidateSource for PlacesClient {
    type Error = PlacesError;

    async fn fetch_candidates(
        &self,
        origin: Coordinate,
        radius_meters: f64,
        category: Option<&str>,
    ) -> Result<Vec<Place>, PlacesError> {
        let records = self.nearby_search(origin, radius_meters, category).await?;
        Ok(records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| normalize_record(record, index, origin, &self.api_key))
            .collect())
    }
}
