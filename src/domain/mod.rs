//! Scoring, financial summaries and recommendation selection.

pub mod catalog;
pub mod entities;
pub mod evaluation;
pub mod recommendation;
pub mod report;
pub mod scoring;
pub mod zoning;

pub use catalog::{AreaProfile, Catalog, CatalogError};
pub use entities::{
    AreaFactors, AreaType, BusinessDefinition, BusinessType, Coordinate, Factor, ResultRecord,
};
pub use evaluation::{evaluate_businesses, summarize, EvaluationSummary};
pub use recommendation::{best_by_payback, best_by_profit_ratio, select, Recommendation};
pub use report::{LocationSummary, RecommendationReport, ZoningExclusion};
pub use scoring::{normalize, ConfigGap, FactorContribution, MarketScore, MarketScorer, MarketTables};
pub use zoning::{FloorAreaLimit, ZoningAssessment, ZoningTable};
