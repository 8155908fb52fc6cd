//! Market potential scoring.
//!
//! A score is the weighted sum of normalised area signals plus a constant
//! offset. Lookups that fall outside the configured tables contribute zero
//! and are reported as [`ConfigGap`]s instead of failing.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::{Deserialize, Serialize};

use super::entities::{AreaFactors, AreaType, BusinessType, Factor};

pub type FactorWeights = BTreeMap<Factor, f64>;

/// Immutable normalisation ranges and weights, keyed by area.
#[derive(Clone, Debug, Default)]
pub struct MarketTables {
    ranges: HashMap<AreaType, BTreeMap<Factor, f64>>,
    weights: HashMap<AreaType, BTreeMap<BusinessType, FactorWeights>>,
}

impl MarketTables {
    pub fn new(
        ranges: HashMap<AreaType, BTreeMap<Factor, f64>>,
        weights: HashMap<AreaType, BTreeMap<BusinessType, FactorWeights>>,
    ) -> Self {
        Self { ranges, weights }
    }

    pub fn knows_area(&self, area: &AreaType) -> bool {
        self.ranges.contains_key(area) || self.weights.contains_key(area)
    }

    /// Maximum reference value; only strictly positive ranges are usable.
    pub fn range(&self, area: &AreaType, factor: Factor) -> Option<f64> {
        self.ranges
            .get(area)
            .and_then(|ranges| ranges.get(&factor))
            .copied()
            .filter(|max| *max > 0.0)
    }

    pub fn weights(&self, area: &AreaType, business: BusinessType) -> Option<&FactorWeights> {
        self.weights
            .get(area)
            .and_then(|by_business| by_business.get(&business))
    }
}

/// A table lookup that found nothing and therefore contributed zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigGap {
    UnknownArea {
        area: AreaType,
    },
    UnknownBusiness {
        area: AreaType,
        business: BusinessType,
    },
    MissingRange {
        area: AreaType,
        factor: Factor,
    },
    MissingWeight {
        area: AreaType,
        business: BusinessType,
        factor: Factor,
    },
}

impl fmt::Display for ConfigGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigGap::UnknownArea { area } => write!(f, "area '{area}' has no ranges or weights"),
            ConfigGap::UnknownBusiness { area, business } => {
                write!(f, "area '{area}' has no weights for {business}")
            }
            ConfigGap::MissingRange { area, factor } => {
                write!(f, "area '{area}' has no usable range for {factor}")
            }
            ConfigGap::MissingWeight {
                area,
                business,
                factor,
            } => write!(f, "area '{area}' has no {factor} weight for {business}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: Factor,
    pub raw: f64,
    pub normalized: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Score of one business type, with its breakdown and any table gaps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketScore {
    pub business: BusinessType,
    pub value: f64,
    pub epsilon: f64,
    pub contributions: Vec<FactorContribution>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<ConfigGap>,
}

impl MarketScore {
    pub fn value(&self) -> f64 {
        self.value
    }

    /// True when every lookup hit the configured tables.
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Map a raw signal into `[0, 1]` relative to `max_reference`.
///
/// `max_reference` must be positive.
pub fn normalize(factor: Factor, raw: f64, max_reference: f64) -> f64 {
    let ratio = raw / max_reference;
    if factor.is_inverted() {
        if raw < max_reference {
            (1.0 - ratio).max(0.0)
        } else {
            0.0
        }
    } else {
        ratio.min(1.0)
    }
}

pub struct MarketScorer<'a> {
    tables: &'a MarketTables,
}

impl<'a> MarketScorer<'a> {
    pub fn new(tables: &'a MarketTables) -> Self {
        Self { tables }
    }

    pub fn score(&self, factors: &AreaFactors, business: BusinessType) -> MarketScore {
        let area = factors.area_type();
        let epsilon = factors.epsilon();
        let mut gaps = Vec::new();

        if !self.tables.knows_area(area) {
            gaps.push(ConfigGap::UnknownArea { area: area.clone() });
            return MarketScore {
                business,
                value: epsilon,
                epsilon,
                contributions: Vec::new(),
                gaps,
            };
        }

        let weights = self.tables.weights(area, business);
        if weights.is_none() {
            gaps.push(ConfigGap::UnknownBusiness {
                area: area.clone(),
                business,
            });
        }

        let mut weighted_sum = 0.0;
        let mut contributions = Vec::with_capacity(factors.factors().len());
        for (&factor, &raw) in factors.factors() {
            let normalized = match self.tables.range(area, factor) {
                Some(max_reference) => normalize(factor, raw, max_reference),
                None => {
                    gaps.push(ConfigGap::MissingRange {
                        area: area.clone(),
                        factor,
                    });
                    0.0
                }
            };

            let weight = match weights {
                Some(weights) => match weights.get(&factor) {
                    Some(weight) => *weight,
                    None => {
                        gaps.push(ConfigGap::MissingWeight {
                            area: area.clone(),
                            business,
                            factor,
                        });
                        0.0
                    }
                },
                None => 0.0,
            };

            let contribution = weight * normalized;
            weighted_sum += contribution;
            contributions.push(FactorContribution {
                factor,
                raw,
                normalized,
                weight,
                contribution,
            });
        }

        MarketScore {
            business,
            value: weighted_sum + epsilon,
            epsilon,
            contributions,
            gaps,
        }
    }
}
