//! Which business types a zoning category permits at a given floor area.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::entities::BusinessType;

/// Largest permitted floor area in m². `null` in the catalog means no limit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FloorAreaLimit {
    UpTo(f64),
    Unlimited,
}

impl FloorAreaLimit {
    /// Limits are inclusive.
    pub fn allows(&self, floor_area: f64) -> bool {
        match self {
            FloorAreaLimit::UpTo(max) => floor_area <= *max,
            FloorAreaLimit::Unlimited => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoningAssessment {
    pub business: BusinessType,
    /// `None` when the category does not allow the business at all.
    pub limit: Option<FloorAreaLimit>,
    pub permitted: bool,
}

/// Zoning category label → business → floor-area limit.
///
/// Businesses missing from a category are not permitted there.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoningTable {
    categories: BTreeMap<String, BTreeMap<BusinessType, FloorAreaLimit>>,
}

impl ZoningTable {
    pub fn new(categories: BTreeMap<String, BTreeMap<BusinessType, FloorAreaLimit>>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn knows(&self, category: &str) -> bool {
        self.categories.contains_key(category.trim())
    }

    pub fn limit(&self, category: &str, business: BusinessType) -> Option<FloorAreaLimit> {
        self.categories
            .get(category.trim())
            .and_then(|limits| limits.get(&business))
            .copied()
    }

    /// Per-business verdicts, or `None` for an unknown category.
    pub fn assess(&self, category: &str, floor_area: f64) -> Option<Vec<ZoningAssessment>> {
        let limits = self.categories.get(category.trim())?;
        Some(
            BusinessType::ALL
                .into_iter()
                .map(|business| {
                    let limit = limits.get(&business).copied();
                    ZoningAssessment {
                        business,
                        limit,
                        permitted: limit.map(|l| l.allows(floor_area)).unwrap_or(false),
                    }
                })
                .collect(),
        )
    }

    pub fn permitted(&self, category: &str, floor_area: f64) -> Option<BTreeSet<BusinessType>> {
        self.assess(category, floor_area).map(|assessments| {
            assessments
                .into_iter()
                .filter(|a| a.permitted)
                .map(|a| a.business)
                .collect()
        })
    }
}
