use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Market signal that feeds the potential score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Population,
    DistanceFromStation,
    Tourist,
    HouseholdIncome,
}

impl Factor {
    pub const ALL: [Factor; 4] = [
        Factor::Population,
        Factor::DistanceFromStation,
        Factor::Tourist,
        Factor::HouseholdIncome,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Factor::Population => "population",
            Factor::DistanceFromStation => "distance_from_station",
            Factor::Tourist => "tourist",
            Factor::HouseholdIncome => "household_income",
        }
    }

    /// Distance-like signals score higher the smaller the raw value is.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Factor::DistanceFromStation)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The small-business types the advisor can recommend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessType {
    Cafe,
    Accommodation,
    ShareAtelier,
}

impl BusinessType {
    pub const ALL: [BusinessType; 3] = [
        BusinessType::Cafe,
        BusinessType::Accommodation,
        BusinessType::ShareAtelier,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            BusinessType::Cafe => "cafe",
            BusinessType::Accommodation => "accommodation",
            BusinessType::ShareAtelier => "shareAtelier",
        }
    }
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Identifier of a configured area profile, e.g. `kamakura`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaType(String);

impl AreaType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AreaType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// WGS84 longitude/latitude in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Market signals observed for one location.
///
/// Values are clamped to be non-negative on construction and never change
/// afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaFactors {
    area_type: AreaType,
    factors: BTreeMap<Factor, f64>,
    epsilon: f64,
}

impl AreaFactors {
    pub fn new(area_type: AreaType, factors: BTreeMap<Factor, f64>, epsilon: f64) -> Self {
        let factors = factors
            .into_iter()
            .map(|(factor, value)| (factor, non_negative(value)))
            .collect();
        Self {
            area_type,
            factors,
            epsilon: non_negative(epsilon),
        }
    }

    pub fn area_type(&self) -> &AreaType {
        &self.area_type
    }

    pub fn factors(&self) -> &BTreeMap<Factor, f64> {
        &self.factors
    }

    pub fn get(&self, factor: Factor) -> Option<f64> {
        self.factors.get(&factor).copied()
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

fn non_negative(value: f64) -> f64 {
    // `f64::max` also maps NaN to 0.0
    value.max(0.0)
}

/// Static financial parameters of one business plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessDefinition {
    pub kind: BusinessType,
    pub name: String,
    pub initial_investment: u64,
    /// Expected customers (or bookings) per month.
    pub users: u64,
    pub unit_price: u64,
    #[serde(default)]
    pub other_revenue: u64,
    pub costs: BTreeMap<String, u64>,
}

impl BusinessDefinition {
    /// Truncated to whole currency units.
    pub fn monthly_revenue(&self, market_score: f64) -> i64 {
        let gross = self.users as f64 * self.unit_price as f64 * market_score;
        (gross + self.other_revenue as f64).floor() as i64
    }

    pub fn monthly_cost(&self) -> i64 {
        self.costs.values().sum::<u64>() as i64
    }

    pub fn with_investment(mut self, initial_investment: u64) -> Self {
        self.initial_investment = initial_investment;
        self
    }
}

/// Financial snapshot of a business at a given market score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub business: BusinessType,
    pub name: String,
    pub market_score: f64,
    pub initial_investment: u64,
    pub monthly_revenue: i64,
    pub monthly_cost: i64,
    pub monthly_profit: i64,
    pub profit_ratio_percent: f64,
    /// `f64::INFINITY` when the investment is never recovered.
    #[serde(with = "unreachable_as_null")]
    pub payback_period_years: f64,
}

impl ResultRecord {
    pub fn pays_back(&self) -> bool {
        self.payback_period_years.is_finite()
    }
}

/// JSON has no infinity, so an unreachable payback travels as `null`.
mod unreachable_as_null {
    use super::*;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_business() -> BusinessDefinition {
        BusinessDefinition {
            kind: BusinessType::Cafe,
            name: "Café".to_string(),
            initial_investment: 1_000,
            users: 3,
            unit_price: 10,
            other_revenue: 0,
            costs: BTreeMap::from([("A".to_string(), 100), ("B".to_string(), 200)]),
        }
    }

    #[test]
    fn monthly_cost_is_exact_sum_of_costs() {
        assert_eq!(sample_business().monthly_cost(), 300);
    }

    #[test]
    fn monthly_revenue_truncates_fractional_units() {
        assert_eq!(sample_business().monthly_revenue(1.05), 31);
    }

    #[test]
    fn other_revenue_is_not_scaled_by_the_score() {
        let mut business = sample_business();
        business.other_revenue = 100;
        assert_eq!(business.monthly_revenue(2.0), 160);
        assert_eq!(business.monthly_revenue(0.5), 115);
    }

    #[test]
    fn area_factors_clamp_negative_inputs() {
        let factors = AreaFactors::new(
            AreaType::from("kamakura"),
            BTreeMap::from([(Factor::Population, -5.0), (Factor::Tourist, f64::NAN)]),
            -0.5,
        );
        assert_eq!(factors.get(Factor::Population), Some(0.0));
        assert_eq!(factors.get(Factor::Tourist), Some(0.0));
        assert_eq!(factors.epsilon(), 0.0);
    }

    #[test]
    fn business_type_uses_catalog_keys() {
        let json = serde_json::to_string(&BusinessType::ShareAtelier).unwrap();
        assert_eq!(json, "\"shareAtelier\"");
        let factor: Factor = serde_json::from_str("\"distance_from_station\"").unwrap();
        assert_eq!(factor, Factor::DistanceFromStation);
    }

    #[test]
    fn unreachable_payback_survives_json() {
        let record = ResultRecord {
            business: BusinessType::Cafe,
            name: "Café".to_string(),
            market_score: 1.0,
            initial_investment: 100,
            monthly_revenue: 10,
            monthly_cost: 10,
            monthly_profit: 0,
            profit_ratio_percent: 0.0,
            payback_period_years: f64::INFINITY,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["payback_period_years"].is_null());
        let back: ResultRecord = serde_json::from_value(json).unwrap();
        assert!(back.payback_period_years.is_infinite());
        assert!(!back.pays_back());
    }
}
