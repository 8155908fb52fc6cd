//! Collaborators the advisor consumes: geocoding, GIS tile lookups, the
//! station dataset and the geocode cache.

pub mod cache;
pub mod error;
pub mod geo;
pub mod geocoder;
pub mod gis;
pub mod http;
pub mod stations;

pub use cache::GeocodeCache;
pub use error::LookupError;
pub use geo::{LocalProjection, TileCoord};
pub use geocoder::Geocoder;
pub use gis::GisClient;
pub use stations::StationIndex;
