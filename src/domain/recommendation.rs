//! Picks the winners out of an evaluated result set.

use serde::{Deserialize, Serialize};

use super::entities::ResultRecord;

/// Indices into the result set the recommendation was drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// One business has both the best profit ratio and the fastest payback.
    Combined { index: usize },
    Split {
        best_profit_ratio: usize,
        fastest_payback: usize,
    },
}

impl Recommendation {
    pub fn best_profit_ratio(&self) -> usize {
        match *self {
            Recommendation::Combined { index } => index,
            Recommendation::Split {
                best_profit_ratio, ..
            } => best_profit_ratio,
        }
    }

    pub fn fastest_payback(&self) -> usize {
        match *self {
            Recommendation::Combined { index } => index,
            Recommendation::Split {
                fastest_payback, ..
            } => fastest_payback,
        }
    }
}

/// First record with the highest profit ratio.
pub fn best_by_profit_ratio(records: &[ResultRecord]) -> Option<usize> {
    first_extreme(records, |candidate, best| {
        candidate.profit_ratio_percent > best.profit_ratio_percent
    })
}

/// First record with the shortest payback period.
pub fn best_by_payback(records: &[ResultRecord]) -> Option<usize> {
    first_extreme(records, |candidate, best| {
        candidate.payback_period_years < best.payback_period_years
    })
}

pub fn select(records: &[ResultRecord]) -> Option<Recommendation> {
    let best_profit_ratio = best_by_profit_ratio(records)?;
    let fastest_payback = best_by_payback(records)?;

    Some(if best_profit_ratio == fastest_payback {
        Recommendation::Combined {
            index: best_profit_ratio,
        }
    } else {
        Recommendation::Split {
            best_profit_ratio,
            fastest_payback,
        }
    })
}

// Replaces the current best only on a strict improvement, so ties keep the
// earliest record.
fn first_extreme<F>(records: &[ResultRecord], better: F) -> Option<usize>
where
    F: Fn(&ResultRecord, &ResultRecord) -> bool,
{
    let mut best: Option<usize> = None;
    for (index, record) in records.iter().enumerate() {
        match best {
            Some(current) if !better(record, &records[current]) => {}
            _ => best = Some(index),
        }
    }
    best
}
