//! Console rendering of catalogs and reports as markdown tables.

use std::fmt::Write as _;

use num_format::{Locale, ToFormattedString};
use tabled::{settings::Style, Table, Tabled};

use crate::domain::{
    Catalog, FloorAreaLimit, MarketScore, Recommendation, RecommendationReport, ResultRecord,
};

#[derive(Debug, Clone, Tabled)]
struct AreaRow {
    #[tabled(rename = "Area")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Signals")]
    signals: String,
    #[tabled(rename = "Epsilon")]
    epsilon: String,
}

#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "Business")]
    name: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Investment")]
    investment: String,
    #[tabled(rename = "Revenue/mo")]
    revenue: String,
    #[tabled(rename = "Cost/mo")]
    cost: String,
    #[tabled(rename = "Profit/mo")]
    profit: String,
    #[tabled(rename = "Profit ratio")]
    ratio: String,
    #[tabled(rename = "Payback")]
    payback: String,
}

#[derive(Debug, Clone, Tabled)]
struct ContributionRow {
    #[tabled(rename = "Business")]
    business: String,
    #[tabled(rename = "Factor")]
    factor: String,
    #[tabled(rename = "Raw")]
    raw: String,
    #[tabled(rename = "Normalized")]
    normalized: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Contribution")]
    contribution: String,
}

pub fn yen(amount: i64) -> String {
    format!("¥{}", amount.to_formatted_string(&Locale::en))
}

pub fn yen_unsigned(amount: u64) -> String {
    format!("¥{}", amount.to_formatted_string(&Locale::en))
}

pub fn score(value: f64) -> String {
    format!("{value:.2}")
}

pub fn ratio(percent: f64) -> String {
    format!("{percent:.1}%")
}

pub fn payback(years: f64) -> String {
    if years.is_finite() {
        format!("{years:.2} y")
    } else {
        "∞".to_string()
    }
}

fn limit(limit: Option<FloorAreaLimit>) -> String {
    match limit {
        None => "not permitted".to_string(),
        Some(FloorAreaLimit::Unlimited) => "no limit".to_string(),
        Some(FloorAreaLimit::UpTo(max)) => format!("up to {max} m²"),
    }
}

fn markdown<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows).with(Style::markdown()).to_string()
}

pub fn render_areas(catalog: &Catalog) -> String {
    let rows = catalog
        .areas
        .iter()
        .map(|(key, profile)| AreaRow {
            key: key.to_string(),
            label: profile.label.clone(),
            signals: if profile.factors.is_some() {
                "fixed".to_string()
            } else {
                "lookup".to_string()
            },
            epsilon: format!("{}", profile.epsilon),
        })
        .collect();
    markdown(rows)
}

fn result_row(record: &ResultRecord) -> ResultRow {
    ResultRow {
        name: record.name.clone(),
        score: score(record.market_score),
        investment: yen_unsigned(record.initial_investment),
        revenue: yen(record.monthly_revenue),
        cost: yen(record.monthly_cost),
        profit: yen(record.monthly_profit),
        ratio: ratio(record.profit_ratio_percent),
        payback: payback(record.payback_period_years),
    }
}

fn breakdown(scores: &[MarketScore]) -> String {
    let rows = scores
        .iter()
        .flat_map(|score| {
            score.contributions.iter().map(move |c| ContributionRow {
                business: score.business.to_string(),
                factor: c.factor.to_string(),
                raw: format!("{:.0}", c.raw),
                normalized: format!("{:.3}", c.normalized),
                weight: format!("{:.2}", c.weight),
                contribution: format!("{:.3}", c.contribution),
            })
        })
        .collect();
    markdown(rows)
}

/// Headline lines naming the recommended business(es).
pub fn headline(report: &RecommendationReport) -> Vec<String> {
    let name = |index: usize| {
        report
            .results
            .get(index)
            .map(|r| r.name.as_str())
            .unwrap_or("?")
    };
    match report.recommendation {
        None => vec!["No business could be evaluated.".to_string()],
        Some(Recommendation::Combined { index }) => vec![format!(
            "Recommended: {} (highest profit ratio and fastest payback)",
            name(index)
        )],
        Some(Recommendation::Split {
            best_profit_ratio,
            fastest_payback,
        }) => vec![
            format!("Highest profit ratio: {}", name(best_profit_ratio)),
            format!("Fastest to break even: {}", name(fastest_payback)),
        ],
    }
}

pub fn render_report(report: &RecommendationReport, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} ({})", report.area_label, report.area);
    let _ = writeln!(out, "run {} at {}", report.run_id, report.generated_at);

    if let Some(location) = &report.location {
        let _ = writeln!(out);
        let _ = writeln!(out, "Property: {}{}", location.region, location.address);
        let _ = writeln!(
            out,
            "  lon {:.6}, lat {:.6}",
            location.coordinate.lon, location.coordinate.lat
        );
        let _ = writeln!(out, "  zoning: {}", location.zoning);
        let _ = writeln!(
            out,
            "  population: {}",
            location.population.to_formatted_string(&Locale::en)
        );
        let _ = writeln!(
            out,
            "  nearest station: {:.0} m",
            location.station_distance_m
        );
        let _ = writeln!(out, "  floor area: {} m²", location.floor_area_m2);
    }

    let _ = writeln!(out);
    let rows = report.results.iter().map(result_row).collect();
    let _ = writeln!(out, "{}", markdown::<ResultRow>(rows));

    if !report.excluded.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Excluded by zoning:");
        for exclusion in &report.excluded {
            let _ = writeln!(out, "  - {} ({})", exclusion.name, limit(exclusion.limit));
        }
    }

    let gaps: Vec<_> = report.gaps().collect();
    if !gaps.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Configuration gaps (scored as zero):");
        for gap in gaps {
            let _ = writeln!(out, "  - {gap}");
        }
    }

    if verbose {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", breakdown(&report.scores));
    }

    let _ = writeln!(out);
    for line in headline(report) {
        let _ = writeln!(out, "{line}");
    }
    out
}
