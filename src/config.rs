//! Runtime settings.
//!
//! Sources, later ones overriding earlier ones:
//! 1. built-in defaults,
//! 2. a TOML file (`--config`, otherwise `akiya.toml` in the user config dir),
//! 3. environment variables prefixed with `AKIYA`, nested with `__`
//!    (`AKIYA__GIS__API_KEY=...` → `gis.api_key`). A `.env` file is honoured.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::AreaType;

pub const ENV_PREFIX: &str = "AKIYA";
pub const CONFIG_FILENAME: &str = "akiya.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is not a valid URL")]
    InvalidUrl(&'static str),
    #[error("{0} must be at least one second")]
    InvalidTimeout(&'static str),
    #[error("tile zoom {0} is outside 1..=20")]
    InvalidZoom(u8),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://msearch.gsi.go.jp/address-search/AddressSearch".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GisSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub zoom: u8,
    pub zoning_layer: String,
    pub zoning_property: String,
    pub population_layer: String,
    pub population_property: String,
    pub timeout_secs: u64,
}

impl Default for GisSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.reinfolib.mlit.go.jp/ex-api/external/".to_string(),
            api_key: None,
            zoom: 15,
            zoning_layer: "XKT002".to_string(),
            zoning_property: "use_area_ja".to_string(),
            population_layer: "XKT013".to_string(),
            population_property: "PTN_2020".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StationSettings {
    /// GeoJSON file with station geometries.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_hours: u64,
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 30 * 24,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub geocoder: GeocoderSettings,
    pub gis: GisSettings,
    pub stations: StationSettings,
    pub cache: CacheSettings,
    /// Replaces the embedded catalog.
    pub catalog_path: Option<PathBuf>,
    /// Catalog area whose tables score geocoded properties.
    pub locate_area: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geocoder: GeocoderSettings::default(),
            gis: GisSettings::default(),
            stations: StationSettings::default(),
            cache: CacheSettings::default(),
            catalog_path: None,
            locate_area: "standard".to_string(),
        }
    }
}

impl Settings {
    /// Load and validate settings. An explicit `path` must exist; the default
    /// location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default) = default_config_path() {
                    builder = builder.add_source(config::File::from(default).required(false));
                }
            }
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if Url::parse(&self.geocoder.base_url).is_err() {
            return Err(ValidationError::InvalidUrl("geocoder.base_url"));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("geocoder.timeout_secs"));
        }
        if Url::parse(&self.gis.base_url).is_err() {
            return Err(ValidationError::InvalidUrl("gis.base_url"));
        }
        if self.gis.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("gis.timeout_secs"));
        }
        if !(1..=20).contains(&self.gis.zoom) {
            return Err(ValidationError::InvalidZoom(self.gis.zoom));
        }
        for (name, value) in [
            ("gis.zoning_layer", &self.gis.zoning_layer),
            ("gis.zoning_property", &self.gis.zoning_property),
            ("gis.population_layer", &self.gis.population_layer),
            ("gis.population_property", &self.gis.population_property),
            ("locate_area", &self.locate_area),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Empty(name));
            }
        }
        Ok(())
    }

    pub fn locate_area(&self) -> AreaType {
        AreaType::new(self.locate_area.trim())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache
            .path
            .clone()
            .unwrap_or_else(crate::infra::GeocodeCache::default_path)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    crate::util::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.gis.zoom, 15);
        assert_eq!(settings.locate_area(), AreaType::from("standard"));
    }

    #[test]
    fn file_then_environment_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "locate_area = \"kamakura\"\n[gis]\nzoom = 14\napi_key = \"from-file\"\n[stations]\npath = \"/data/stations.geojson\""
        )
        .unwrap();

        env::set_var("AKIYA__GIS__API_KEY", "from-env");
        env::set_var("AKIYA__GEOCODER__TIMEOUT_SECS", "3");
        let result = Settings::load(Some(file.path()));
        env::remove_var("AKIYA__GIS__API_KEY");
        env::remove_var("AKIYA__GEOCODER__TIMEOUT_SECS");

        let settings = result.unwrap();
        assert_eq!(settings.locate_area, "kamakura");
        assert_eq!(settings.gis.zoom, 14);
        assert_eq!(settings.gis.api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.geocoder.timeout_secs, 3);
        assert_eq!(
            settings.stations.path,
            Some(PathBuf::from("/data/stations.geojson"))
        );
        assert_eq!(settings.gis.zoning_layer, "XKT002");
    }

    #[test]
    fn invalid_zoom_is_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AKIYA__GIS__ZOOM", "0");
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[gis]").unwrap();
        let result = Settings::load(Some(file.path()));
        env::remove_var("AKIYA__GIS__ZOOM");

        assert!(matches!(
            result,
            Err(ConfigError::Invalid(ValidationError::InvalidZoom(0)))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let result = Settings::load(Some(Path::new("/nonexistent/akiya.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.gis.timeout_secs = 0;
        assert_eq!(
            settings.validate(),
            Err(ValidationError::InvalidTimeout("gis.timeout_secs"))
        );
    }
}
