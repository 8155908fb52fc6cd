//! One recommendation run, from request to report.

use std::{collections::BTreeMap, time::Duration};

use thiserror::Error;

use crate::{
    config::Settings,
    domain::{
        evaluate_businesses, AreaFactors, AreaType, BusinessDefinition, Catalog, CatalogError,
        EvaluationSummary, Factor, LocationSummary, MarketScorer, MarketTables,
        RecommendationReport, ZoningExclusion,
    },
    infra::{GeocodeCache, Geocoder, GisClient, LookupError, StationIndex},
};

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("unknown area '{0}'")]
    UnknownArea(AreaType),
    #[error("area '{0}' has no fixed market signals; use `locate` instead")]
    NoStaticFactors(AreaType),
    #[error("no station dataset configured (set stations.path)")]
    MissingStations,
    #[error("{stage} lookup failed: {source}")]
    Lookup {
        stage: &'static str,
        #[source]
        source: LookupError,
    },
    #[error("zoning category '{0}' is not in the permission table")]
    UnknownZoning(String),
    #[error("floor area must be a positive number of m²")]
    InvalidFloorArea,
}

impl AdvisorError {
    fn lookup(stage: &'static str) -> impl FnOnce(LookupError) -> AdvisorError {
        move |source| AdvisorError::Lookup { stage, source }
    }
}

/// Evaluate a configured area from its fixed signals.
#[derive(Clone, Debug)]
pub struct AnalyzeRequest {
    pub area: AreaType,
    pub investment: Option<u64>,
}

/// Evaluate a property at an address from looked-up signals.
#[derive(Clone, Debug)]
pub struct LocateRequest {
    pub region: String,
    pub address: String,
    pub investment: Option<u64>,
    pub floor_area_m2: f64,
}

/// External services used by [`Advisor::locate`].
pub struct Collaborators {
    pub geocoder: Geocoder,
    pub gis: GisClient,
    pub stations: StationIndex,
}

impl Collaborators {
    pub fn from_settings(settings: &Settings) -> Result<Self, AdvisorError> {
        let mut geocoder =
            Geocoder::new(&settings.geocoder).map_err(AdvisorError::lookup("geocoder"))?;
        if settings.cache.enabled {
            let ttl = Duration::from_secs(settings.cache.ttl_hours.saturating_mul(3600));
            geocoder = geocoder.with_cache(GeocodeCache::open(settings.cache_path(), ttl));
        }
        let gis = GisClient::new(&settings.gis).map_err(AdvisorError::lookup("gis"))?;
        let path = settings
            .stations
            .path
            .as_deref()
            .ok_or(AdvisorError::MissingStations)?;
        let stations = StationIndex::load(path).map_err(AdvisorError::lookup("station"))?;

        Ok(Self {
            geocoder,
            gis,
            stations,
        })
    }
}

pub struct Advisor {
    catalog: Catalog,
    tables: MarketTables,
    locate_area: AreaType,
}

impl Advisor {
    pub fn new(catalog: Catalog, locate_area: AreaType) -> Self {
        let tables = catalog.market_tables();
        Self {
            catalog,
            tables,
            locate_area,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AdvisorError> {
        let catalog = match &settings.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::embedded()?,
        };
        Ok(Self::new(catalog, settings.locate_area()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Score and summarize `businesses` for `factors`.
    pub fn evaluate(
        &self,
        factors: &AreaFactors,
        businesses: &[BusinessDefinition],
    ) -> EvaluationSummary {
        evaluate_businesses(&MarketScorer::new(&self.tables), factors, businesses)
    }

    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<RecommendationReport, AdvisorError> {
        let profile = self
            .catalog
            .area(&request.area)
            .ok_or_else(|| AdvisorError::UnknownArea(request.area.clone()))?;
        let factors = self
            .catalog
            .static_factors(&request.area)
            .ok_or_else(|| AdvisorError::NoStaticFactors(request.area.clone()))?;
        let businesses = self.catalog.businesses_with_investment(request.investment);

        tracing::info!(area = %request.area, "evaluating static scenario");
        let summary = self.evaluate(&factors, &businesses);
        Ok(RecommendationReport::new(
            request.area.clone(),
            profile.label.clone(),
            summary,
        ))
    }

    /// Geocode the property, look up its signals and evaluate the businesses
    /// its zoning permits. The first failed lookup ends the run.
    pub async fn locate(
        &self,
        collaborators: &Collaborators,
        request: &LocateRequest,
    ) -> Result<RecommendationReport, AdvisorError> {
        if !(request.floor_area_m2.is_finite() && request.floor_area_m2 > 0.0) {
            return Err(AdvisorError::InvalidFloorArea);
        }
        let area = self.locate_area.clone();
        let profile = self
            .catalog
            .area(&area)
            .ok_or_else(|| AdvisorError::UnknownArea(area.clone()))?;

        let coordinate = collaborators
            .geocoder
            .geocode(&request.region, &request.address)
            .await
            .map_err(AdvisorError::lookup("geocode"))?;
        tracing::info!(lon = coordinate.lon, lat = coordinate.lat, "geocoded property");

        let zoning = collaborators
            .gis
            .zoning_at(coordinate)
            .await
            .map_err(AdvisorError::lookup("zoning"))?;
        let population = collaborators
            .gis
            .population_at(coordinate)
            .await
            .map_err(AdvisorError::lookup("population"))?;
        let station_distance_m = collaborators
            .stations
            .nearest_distance_m(coordinate)
            .map_err(AdvisorError::lookup("station"))?;
        tracing::info!(%zoning, population, station_distance_m, "looked up area signals");

        let assessments = self
            .catalog
            .zoning
            .assess(&zoning, request.floor_area_m2)
            .ok_or_else(|| AdvisorError::UnknownZoning(zoning.clone()))?;

        let mut businesses = Vec::new();
        let mut excluded = Vec::new();
        for business in self.catalog.businesses_with_investment(request.investment) {
            let verdict = assessments.iter().find(|a| a.business == business.kind);
            match verdict {
                Some(verdict) if verdict.permitted => businesses.push(business),
                _ => excluded.push(ZoningExclusion {
                    business: business.kind,
                    name: business.name.clone(),
                    limit: verdict.and_then(|v| v.limit),
                }),
            }
        }

        let factors = AreaFactors::new(
            area.clone(),
            BTreeMap::from([
                (Factor::Population, population as f64),
                (Factor::DistanceFromStation, station_distance_m),
            ]),
            profile.epsilon,
        );
        let summary = self.evaluate(&factors, &businesses);

        let location = LocationSummary {
            region: request.region.clone(),
            address: request.address.clone(),
            coordinate,
            zoning,
            population,
            station_distance_m,
            floor_area_m2: request.floor_area_m2,
        };
        Ok(
            RecommendationReport::new(area, profile.label.clone(), summary)
                .with_location(location)
                .with_exclusions(excluded),
        )
    }
}
