//! Scenario configuration: area profiles, the business catalog and the
//! zoning permission table.

use std::{
    collections::{BTreeMap, HashMap},
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{AreaFactors, AreaType, BusinessDefinition, BusinessType, Factor};
use super::scoring::{FactorWeights, MarketTables};
use super::zoning::ZoningTable;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("embedded catalog asset is missing")]
    MissingAsset,
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no businesses")]
    NoBusinesses,
    #[error("business {0} is defined more than once")]
    DuplicateBusiness(BusinessType),
    #[error("area '{area}': range for {factor} must be positive")]
    InvalidRange { area: AreaType, factor: Factor },
    #[error("area '{area}': {business} weight for {factor} must be within [0, 1]")]
    InvalidWeight {
        area: AreaType,
        business: BusinessType,
        factor: Factor,
    },
    #[error("area '{area}': epsilon must be a non-negative number")]
    InvalidEpsilon { area: AreaType },
    #[error("area '{area}': static value for {factor} must be a non-negative number")]
    InvalidFactor { area: AreaType, factor: Factor },
}

/// One selectable area and the tables used to score it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaProfile {
    pub label: String,
    #[serde(default)]
    pub epsilon: f64,
    pub ranges: BTreeMap<Factor, f64>,
    pub weights: BTreeMap<BusinessType, FactorWeights>,
    /// Fixed market signals; absent for areas that are only scored from
    /// looked-up data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factors: Option<BTreeMap<Factor, f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub areas: BTreeMap<AreaType, AreaProfile>,
    pub businesses: Vec<BusinessDefinition>,
    #[serde(default)]
    pub zoning: ZoningTable,
}

impl Catalog {
    /// The catalog shipped inside the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        let json = crate::util::assets::catalog_json().ok_or(CatalogError::MissingAsset)?;
        Self::from_json(json)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            "loaded catalog from {} ({} areas, {} businesses)",
            path.display(),
            catalog.areas.len(),
            catalog.businesses.len()
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.businesses.is_empty() {
            return Err(CatalogError::NoBusinesses);
        }
        let mut seen = Vec::with_capacity(self.businesses.len());
        for business in &self.businesses {
            if seen.contains(&business.kind) {
                return Err(CatalogError::DuplicateBusiness(business.kind));
            }
            seen.push(business.kind);
        }

        for (area, profile) in &self.areas {
            if !(profile.epsilon.is_finite() && profile.epsilon >= 0.0) {
                return Err(CatalogError::InvalidEpsilon { area: area.clone() });
            }
            for (&factor, &max) in &profile.ranges {
                if !(max.is_finite() && max > 0.0) {
                    return Err(CatalogError::InvalidRange {
                        area: area.clone(),
                        factor,
                    });
                }
            }
            for (&business, weights) in &profile.weights {
                for (&factor, &weight) in weights {
                    if !(0.0..=1.0).contains(&weight) {
                        return Err(CatalogError::InvalidWeight {
                            area: area.clone(),
                            business,
                            factor,
                        });
                    }
                }
            }
            for (&factor, &value) in profile.factors.iter().flatten() {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(CatalogError::InvalidFactor {
                        area: area.clone(),
                        factor,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn area(&self, area: &AreaType) -> Option<&AreaProfile> {
        self.areas.get(area)
    }

    /// Market signals of an area with fixed factors.
    pub fn static_factors(&self, area: &AreaType) -> Option<AreaFactors> {
        let profile = self.areas.get(area)?;
        let factors = profile.factors.clone()?;
        Some(AreaFactors::new(area.clone(), factors, profile.epsilon))
    }

    pub fn business(&self, kind: BusinessType) -> Option<&BusinessDefinition> {
        self.businesses.iter().find(|b| b.kind == kind)
    }

    /// Businesses in catalog order, optionally with a shared investment.
    pub fn businesses_with_investment(&self, investment: Option<u64>) -> Vec<BusinessDefinition> {
        self.businesses
            .iter()
            .cloned()
            .map(|business| match investment {
                Some(amount) => business.with_investment(amount),
                None => business,
            })
            .collect()
    }

    pub fn market_tables(&self) -> MarketTables {
        let mut ranges = HashMap::with_capacity(self.areas.len());
        let mut weights = HashMap::with_capacity(self.areas.len());
        for (area, profile) in &self.areas {
            ranges.insert(area.clone(), profile.ranges.clone());
            weights.insert(area.clone(), profile.weights.clone());
        }
        MarketTables::new(ranges, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zoning::FloorAreaLimit;

    #[test]
    fn embedded_catalog_is_valid() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.businesses.len(), 3);
        assert_eq!(
            catalog
                .businesses
                .iter()
                .map(|b| b.kind)
                .collect::<Vec<_>>(),
            BusinessType::ALL.to_vec()
        );
        assert!(catalog.area(&AreaType::from("kamakura")).is_some());
        assert!(catalog.area(&AreaType::from("hayama")).is_some());
        assert!(catalog.area(&AreaType::from("standard")).is_some());
        assert!(!catalog.zoning.is_empty());
    }

    #[test]
    fn embedded_business_costs() {
        let catalog = Catalog::embedded().unwrap();
        let cafe = catalog.business(BusinessType::Cafe).unwrap();
        assert_eq!(cafe.monthly_cost(), 2_400_000);
        let accommodation = catalog.business(BusinessType::Accommodation).unwrap();
        assert_eq!(accommodation.monthly_cost(), 820_000);
        let atelier = catalog.business(BusinessType::ShareAtelier).unwrap();
        assert_eq!(atelier.monthly_cost(), 658_000);
    }

    #[test]
    fn embedded_zoning_table_matches_building_rules() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(
            catalog
                .zoning
                .limit("第一種低層住居専用地域", BusinessType::Cafe),
            Some(FloorAreaLimit::UpTo(50.0))
        );
        assert_eq!(
            catalog
                .zoning
                .limit("第一種低層住居専用地域", BusinessType::Accommodation),
            None
        );
        assert_eq!(
            catalog.zoning.limit("商業地域", BusinessType::Accommodation),
            Some(FloorAreaLimit::Unlimited)
        );
    }

    #[test]
    fn static_factors_only_for_fixed_areas() {
        let catalog = Catalog::embedded().unwrap();
        let kamakura = catalog.static_factors(&AreaType::from("kamakura")).unwrap();
        assert_eq!(kamakura.get(Factor::Population), Some(8_000.0));
        assert_eq!(kamakura.epsilon(), 0.5);
        assert!(catalog.static_factors(&AreaType::from("standard")).is_none());
    }

    #[test]
    fn investment_override_applies_to_every_business() {
        let catalog = Catalog::embedded().unwrap();
        let businesses = catalog.businesses_with_investment(Some(5_000_000));
        assert!(businesses.iter().all(|b| b.initial_investment == 5_000_000));
    }

    #[test]
    fn rejects_non_positive_range() {
        let json = r#"{
            "areas": { "x": { "label": "X", "ranges": { "population": 0 }, "weights": {} } },
            "businesses": [{
                "kind": "cafe", "name": "Café", "initial_investment": 1,
                "users": 1, "unit_price": 1, "costs": {}
            }]
        }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::InvalidRange { factor: Factor::Population, .. })
        ));
    }

    #[test]
    fn rejects_weight_outside_unit_interval() {
        let json = r#"{
            "areas": { "x": {
                "label": "X",
                "ranges": { "population": 10 },
                "weights": { "cafe": { "population": 1.5 } }
            } },
            "businesses": [{
                "kind": "cafe", "name": "Café", "initial_investment": 1,
                "users": 1, "unit_price": 1, "costs": {}
            }]
        }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::InvalidWeight { business: BusinessType::Cafe, .. })
        ));
    }

    #[test]
    fn rejects_empty_and_duplicate_businesses() {
        let empty = r#"{ "areas": {}, "businesses": [] }"#;
        assert!(matches!(
            Catalog::from_json(empty),
            Err(CatalogError::NoBusinesses)
        ));

        let duplicate = r#"{ "areas": {}, "businesses": [
            { "kind": "cafe", "name": "A", "initial_investment": 1, "users": 1, "unit_price": 1, "costs": {} },
            { "kind": "cafe", "name": "B", "initial_investment": 1, "users": 1, "unit_price": 1, "costs": {} }
        ] }"#;
        assert!(matches!(
            Catalog::from_json(duplicate),
            Err(CatalogError::DuplicateBusiness(BusinessType::Cafe))
        ));
    }

    #[test]
    fn negative_currency_is_a_parse_error() {
        let json = r#"{ "areas": {}, "businesses": [
            { "kind": "cafe", "name": "A", "initial_investment": -1, "users": 1, "unit_price": 1, "costs": {} }
        ] }"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Parse(_))));
    }
}
