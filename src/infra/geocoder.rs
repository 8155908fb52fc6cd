//! Address geocoding against a GSI address-search style endpoint.
//!
//! The endpoint takes `?q=<address>` and answers with a JSON array of GeoJSON
//! point features; an empty array means the address is unknown.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::cache::GeocodeCache;
use super::error::LookupError;
use super::http::{build_client, fetch_json};
use crate::config::GeocoderSettings;
use crate::domain::Coordinate;

pub struct Geocoder {
    http: Client,
    base_url: Url,
    cache: Option<Mutex<GeocodeCache>>,
}

impl Geocoder {
    pub fn new(settings: &GeocoderSettings) -> Result<Self, LookupError> {
        Ok(Self {
            http: build_client(Duration::from_secs(settings.timeout_secs))?,
            base_url: Url::parse(&settings.base_url)?,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: GeocodeCache) -> Self {
        self.cache = Some(Mutex::new(cache));
        self
    }

    /// Coordinates of `address` within `region` (prefecture, city, ...).
    pub async fn geocode(&self, region: &str, address: &str) -> Result<Coordinate, LookupError> {
        let query = format!("{}{}", region.trim(), address.trim());
        if query.is_empty() {
            return Err(LookupError::not_found("address"));
        }

        if let Some(cache) = &self.cache {
            if let Some(coordinate) = cache.lock().await.get(&query) {
                tracing::debug!(%query, "serving cached geocode");
                return Ok(coordinate);
            }
        }

        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", &query);
        tracing::info!(%query, "geocoding address");

        let features: Vec<AddressFeatureDto> = fetch_json(self.http.get(url)).await?;
        let coordinate = features
            .into_iter()
            .find_map(|feature| feature.coordinate())
            .ok_or_else(|| LookupError::not_found("address"))?;

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().await;
            cache.insert(&query, coordinate);
            if let Err(e) = cache.save() {
                tracing::warn!("failed to save geocode cache: {e}");
            }
        }

        Ok(coordinate)
    }
}

#[derive(Debug, Deserialize)]
struct AddressFeatureDto {
    geometry: Option<PointDto>,
}

#[derive(Debug, Deserialize)]
struct PointDto {
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl AddressFeatureDto {
    fn coordinate(&self) -> Option<Coordinate> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => {
                Some(Coordinate::new(*lon, *lat))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_feature_with_coordinates_wins() {
        let json = r#"[
            { "geometry": null, "type": "Feature" },
            { "geometry": { "coordinates": [139.576, 35.2696], "type": "Point" },
              "type": "Feature", "properties": { "title": "神奈川県三浦郡葉山町堀内" } }
        ]"#;
        let features: Vec<AddressFeatureDto> = serde_json::from_str(json).unwrap();
        let found = features.into_iter().find_map(|f| f.coordinate());
        assert_eq!(found, Some(Coordinate::new(139.576, 35.2696)));
    }
}
