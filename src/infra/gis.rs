//! Zoning and population-grid lookups from a tiled GeoJSON API.
//!
//! Each layer is served per web-mercator tile as
//! `{base}/{layer}?response_format=geojson&z=..&x=..&y=..`. The feature whose
//! polygon contains the queried point carries the wanted property.

use std::time::Duration;

use geojson::{Feature, FeatureCollection};
use reqwest::{Client, Url};

use super::error::LookupError;
use super::geo::{feature_covers, TileCoord};
use super::http::{base_url, build_client, fetch_json};
use crate::config::GisSettings;
use crate::domain::Coordinate;

const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Clone, Debug)]
pub struct LayerSpec {
    pub layer: String,
    pub property: String,
}

pub struct GisClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    zoom: u8,
    zoning: LayerSpec,
    population: LayerSpec,
}

impl GisClient {
    pub fn new(settings: &GisSettings) -> Result<Self, LookupError> {
        Ok(Self {
            http: build_client(Duration::from_secs(settings.timeout_secs))?,
            base_url: base_url(&settings.base_url)?,
            api_key: settings.api_key.clone().filter(|key| !key.is_empty()),
            zoom: settings.zoom,
            zoning: LayerSpec {
                layer: settings.zoning_layer.clone(),
                property: settings.zoning_property.clone(),
            },
            population: LayerSpec {
                layer: settings.population_layer.clone(),
                property: settings.population_property.clone(),
            },
        })
    }

    /// Zoning category label of the polygon containing `point`.
    pub async fn zoning_at(&self, point: Coordinate) -> Result<String, LookupError> {
        let feature = self.feature_at(&self.zoning.layer, point, "zoning").await?;
        feature
            .property(&self.zoning.property)
            .and_then(|value| value.as_str())
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .ok_or_else(|| LookupError::not_found("zoning"))
    }

    /// Population of the grid cell containing `point`, rounded to a whole
    /// number of people.
    pub async fn population_at(&self, point: Coordinate) -> Result<u64, LookupError> {
        let feature = self
            .feature_at(&self.population.layer, point, "population")
            .await?;
        feature
            .property(&self.population.property)
            .and_then(numeric_value)
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value.round() as u64)
            .ok_or_else(|| LookupError::not_found("population"))
    }

    async fn feature_at(
        &self,
        layer: &str,
        point: Coordinate,
        what: &'static str,
    ) -> Result<Feature, LookupError> {
        let tile = TileCoord::containing(point, self.zoom);
        let collection = self.fetch_tile(layer, tile).await?;
        tracing::debug!(
            layer,
            z = tile.z,
            x = tile.x,
            y = tile.y,
            features = collection.features.len(),
            "fetched tile"
        );
        collection
            .features
            .into_iter()
            .find(|feature| feature_covers(feature, point))
            .ok_or_else(|| LookupError::not_found(what))
    }

    async fn fetch_tile(&self, layer: &str, tile: TileCoord) -> Result<FeatureCollection, LookupError> {
        let mut url = self.base_url.join(layer)?;
        url.query_pairs_mut()
            .append_pair("response_format", "geojson")
            .append_pair("z", &tile.z.to_string())
            .append_pair("x", &tile.x.to_string())
            .append_pair("y", &tile.y.to_string());

        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        fetch_json(request).await
    }
}

/// Numbers arrive either as JSON numbers or as numeric strings.
fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}
