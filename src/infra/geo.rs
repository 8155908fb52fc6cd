//! Tile addressing, a local metric projection and the GeoJSON → `geo`
//! conversions the lookups run on.

use std::f64::consts::PI;

use geo::{Contains, Coord, EuclideanDistance, Geometry, MapCoords, Point};

use crate::domain::Coordinate;

/// WGS84 semi-major axis.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Web-mercator ("slippy map") tile address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn containing(point: Coordinate, zoom: u8) -> Self {
        let n = f64::from(1u32 << zoom);
        let lat = point.lat.to_radians();
        let x = ((point.lon + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();
        let max = n - 1.0;
        Self {
            z: zoom,
            x: x.clamp(0.0, max) as u32,
            y: y.clamp(0.0, max) as u32,
        }
    }
}

/// Equirectangular projection centred on `origin`, in metres.
///
/// Accurate enough for the few kilometres a station search spans.
#[derive(Clone, Copy, Debug)]
pub struct LocalProjection {
    origin: Coordinate,
    cos_lat: f64,
}

impl LocalProjection {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }

    pub fn project(&self, point: Coordinate) -> Coord<f64> {
        Coord {
            x: (point.lon - self.origin.lon).to_radians() * self.cos_lat * EARTH_RADIUS_M,
            y: (point.lat - self.origin.lat).to_radians() * EARTH_RADIUS_M,
        }
    }

    /// `geometry` (lon/lat degrees) in metres around the origin.
    pub fn project_geometry(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        geometry.map_coords(|c| self.project(Coordinate::new(c.x, c.y)))
    }

    /// Shortest planar distance from the origin to `geometry`; zero inside
    /// areal geometries, `None` for empty ones.
    pub fn distance_to(&self, geometry: &Geometry<f64>) -> Option<f64> {
        distance_from_origin(&self.project_geometry(geometry))
    }
}

fn distance_from_origin(geometry: &Geometry<f64>) -> Option<f64> {
    let origin = Point::new(0.0, 0.0);
    let distance = match geometry {
        Geometry::Point(point) => origin.euclidean_distance(point),
        Geometry::MultiPoint(points) => origin.euclidean_distance(points),
        Geometry::Line(line) => origin.euclidean_distance(line),
        Geometry::LineString(line) => match line.0.as_slice() {
            [] => return None,
            [single] => origin.euclidean_distance(&Point::from(*single)),
            _ => origin.euclidean_distance(line),
        },
        Geometry::MultiLineString(lines) => origin.euclidean_distance(lines),
        Geometry::Polygon(polygon) => origin.euclidean_distance(polygon),
        Geometry::MultiPolygon(polygons) => origin.euclidean_distance(polygons),
        Geometry::Rect(rect) => origin.euclidean_distance(&rect.to_polygon()),
        Geometry::Triangle(triangle) => origin.euclidean_distance(&triangle.to_polygon()),
        Geometry::GeometryCollection(collection) => {
            return collection
                .0
                .iter()
                .filter_map(distance_from_origin)
                .reduce(f64::min);
        }
    };
    // empty multi-geometries fold to f64::MAX
    (distance.is_finite() && distance < f64::MAX).then_some(distance)
}

/// Convert a decoded GeoJSON geometry; malformed ones are skipped.
pub fn to_geo(geometry: geojson::Geometry) -> Option<Geometry<f64>> {
    match Geometry::<f64>::try_from(geometry) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            tracing::debug!("skipping unusable geometry: {e}");
            None
        }
    }
}

/// Whether an areal geometry covers `target`; lines and points cover nothing.
pub fn covers(geometry: &Geometry<f64>, target: Coordinate) -> bool {
    let point = Point::new(target.lon, target.lat);
    match geometry {
        Geometry::Polygon(polygon) => polygon.contains(&point),
        Geometry::MultiPolygon(polygons) => polygons.contains(&point),
        Geometry::Rect(rect) => rect.contains(&point),
        Geometry::GeometryCollection(collection) => {
            collection.0.iter().any(|member| covers(member, target))
        }
        _ => false,
    }
}

/// Whether the feature's geometry covers `point`.
pub fn feature_covers(feature: &geojson::Feature, point: Coordinate) -> bool {
    feature
        .geometry
        .clone()
        .and_then(to_geo)
        .is_some_and(|geometry| covers(&geometry, point))
}
