use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use super::entities::{AreaType, BusinessType, Coordinate, ResultRecord};
use super::evaluation::EvaluationSummary;
use super::recommendation::{select, Recommendation};
use super::scoring::{ConfigGap, MarketScore};
use super::zoning::FloorAreaLimit;

/// Signals looked up for a geocoded property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationSummary {
    pub region: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub zoning: String,
    pub population: u64,
    pub station_distance_m: f64,
    pub floor_area_m2: f64,
}

/// A business removed from the run because zoning does not allow it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoningExclusion {
    pub business: BusinessType,
    pub name: String,
    /// `None` when the zoning category forbids the business outright.
    pub limit: Option<FloorAreaLimit>,
}

/// Everything produced by one recommendation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub run_id: Uuid,
    pub generated_at: String,
    pub area: AreaType,
    pub area_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSummary>,
    pub scores: Vec<MarketScore>,
    pub results: Vec<ResultRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ZoningExclusion>,
    pub recommendation: Option<Recommendation>,
}

impl RecommendationReport {
    pub fn new(area: AreaType, area_label: impl Into<String>, summary: EvaluationSummary) -> Self {
        let recommendation = select(&summary.results);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            area,
            area_label: area_label.into(),
            location: None,
            scores: summary.scores,
            results: summary.results,
            excluded: Vec::new(),
            recommendation,
        }
    }

    pub fn with_location(mut self, location: LocationSummary) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_exclusions(mut self, excluded: Vec<ZoningExclusion>) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn gaps(&self) -> impl Iterator<Item = &ConfigGap> {
        self.scores.iter().flat_map(|score| score.gaps.iter())
    }

    pub fn best_profit_ratio(&self) -> Option<&ResultRecord> {
        self.recommendation
            .and_then(|r| self.results.get(r.best_profit_ratio()))
    }

    pub fn fastest_payback(&self) -> Option<&ResultRecord> {
        self.recommendation
            .and_then(|r| self.results.get(r.fastest_payback()))
    }
}
