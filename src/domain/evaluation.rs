use super::entities::{AreaFactors, BusinessDefinition, ResultRecord};
use super::scoring::{MarketScore, MarketScorer};

/// Outcome of one evaluation pass over a business catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationSummary {
    pub scores: Vec<MarketScore>,
    pub results: Vec<ResultRecord>,
}

/// Score every business for the given area and summarize it, keeping the
/// catalog order.
pub fn evaluate_businesses(
    scorer: &MarketScorer<'_>,
    factors: &AreaFactors,
    businesses: &[BusinessDefinition],
) -> EvaluationSummary {
    let mut scores = Vec::with_capacity(businesses.len());
    let mut results = Vec::with_capacity(businesses.len());

    for business in businesses {
        let score = scorer.score(factors, business.kind);
        for gap in &score.gaps {
            tracing::warn!(business = %business.kind, "scoring gap: {gap}");
        }
        results.push(summarize(business, score.value()));
        scores.push(score);
    }

    EvaluationSummary { scores, results }
}

pub fn summarize(business: &BusinessDefinition, market_score: f64) -> ResultRecord {
    let monthly_revenue = business.monthly_revenue(market_score);
    let monthly_cost = business.monthly_cost();
    let monthly_profit = monthly_revenue - monthly_cost;

    ResultRecord {
        business: business.kind,
        name: business.name.clone(),
        market_score,
        initial_investment: business.initial_investment,
        monthly_revenue,
        monthly_cost,
        monthly_profit,
        profit_ratio_percent: profit_ratio_percent(monthly_profit, monthly_cost),
        payback_period_years: payback_period_years(business.initial_investment, monthly_profit),
    }
}

/// Zero when there are no costs to relate the profit to.
pub fn profit_ratio_percent(monthly_profit: i64, monthly_cost: i64) -> f64 {
    if monthly_cost == 0 {
        return 0.0;
    }
    monthly_profit as f64 / monthly_cost as f64 * 100.0
}

/// Infinite unless the business makes a positive monthly profit.
pub fn payback_period_years(initial_investment: u64, monthly_profit: i64) -> f64 {
    if monthly_profit <= 0 {
        return f64::INFINITY;
    }
    initial_investment as f64 / monthly_profit as f64 / 12.0
}
