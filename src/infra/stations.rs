//! Nearest-station distance from a GeoJSON station dataset.

use std::{fs, path::Path};

use geo::Geometry;
use geojson::FeatureCollection;

use super::error::LookupError;
use super::geo::{to_geo, LocalProjection};
use crate::domain::Coordinate;

/// Station geometries in lon/lat degrees (points, platforms as lines, or
/// footprints).
#[derive(Clone, Debug, Default)]
pub struct StationIndex {
    geometries: Vec<Geometry<f64>>,
}

impl StationIndex {
    pub fn load(path: &Path) -> Result<Self, LookupError> {
        let json = fs::read_to_string(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_geojson(&json)?;
        tracing::info!(
            "loaded {} station geometries from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    pub fn from_geojson(json: &str) -> Result<Self, LookupError> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        let geometries = collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .filter_map(to_geo)
            .collect();
        Ok(Self { geometries })
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Minimum planar distance in metres from `point` to any station.
    pub fn nearest_distance_m(&self, point: Coordinate) -> Result<f64, LookupError> {
        let projection = LocalProjection::new(point);
        self.geometries
            .iter()
            .filter_map(|geometry| projection.distance_to(geometry))
            .reduce(f64::min)
            .ok_or_else(|| LookupError::not_found("station"))
    }
}
