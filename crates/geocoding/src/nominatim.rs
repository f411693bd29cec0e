//! Nominatim HTTP client.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use billbook_core::Coordinates;

use crate::config::GeocoderConfig;
use crate::error::{GeocodingError, GeocodingResult};
use crate::place::{Place, WirePlace};
use crate::Geocoder;

/// [`Geocoder`] backed by a Nominatim instance over HTTP.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    config: GeocoderConfig,
}

impl NominatimGeocoder {
    pub fn new(config: GeocoderConfig) -> GeocodingResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| GeocodingError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> GeocodingResult<T> {
        let resp = self.http.get(url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeocodingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| GeocodingError::Malformed(e.to_string()))
    }
}

/// Query string of a forward lookup, scoped to the configured countries.
fn search_params(config: &GeocoderConfig, query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("format", "json".to_string()),
        ("q", query.to_string()),
        ("countrycodes", config.country_codes.clone()),
        ("limit", config.result_limit.to_string()),
        ("addressdetails", "1".to_string()),
    ]
}

/// Usable candidates in service order, at most `limit` of them.
fn decode_candidates(wire: Vec<WirePlace>, limit: usize) -> Vec<Place> {
    wire.into_iter()
        .filter_map(WirePlace::into_candidate)
        .take(limit)
        .collect()
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> GeocodingResult<Vec<Place>> {
        let limit = self.config.result_limit;
        debug!(query, countrycodes = %self.config.country_codes, limit, "forward geocoding");

        let params = search_params(&self.config, query);
        let wire: Vec<WirePlace> = self.get_json(&self.endpoint("search"), &params).await?;

        let places = decode_candidates(wire, limit);
        debug!(results = places.len(), "forward geocoding done");
        Ok(places)
    }

    async fn reverse(&self, at: Coordinates) -> GeocodingResult<Place> {
        debug!(lat = at.latitude(), lon = at.longitude(), "reverse geocoding");

        let params = [
            ("format", "json".to_string()),
            ("lat", at.latitude().to_string()),
            ("lon", at.longitude().to_string()),
        ];
        let wire: WirePlace = self.get_json(&self.endpoint("reverse"), &params).await?;

        let place = wire.into_reverse(at);
        if place.display_name.is_none() {
            warn!(
                lat = at.latitude(),
                lon = at.longitude(),
                "reverse geocoding returned no display name"
            );
        }
        Ok(place)
    }
}
