use serde::{Deserialize, Serialize};

use crate::models::{Asset, ReserveSnapshot};
use crate::utils::fixed_point::{format_units, ray_to_percent, to_f64};

/// Utilization above which a reserve is flagged.
pub const UTILIZATION_WARNING_PERCENT: f64 = 75.0;

/// Reported alongside each reserve; informational only.
pub const UTILIZATION_THRESHOLD_PERCENT: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
}

impl RiskTier {
    pub fn for_utilization(utilization: f64) -> Self {
        if utilization > UTILIZATION_WARNING_PERCENT {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

/// Display metrics derived from one reserve snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveMetrics {
    /// Percentage in [0, 100].
    pub utilization: f64,
    #[serde(rename = "supplyAPY")]
    pub supply_apy: f64,
    #[serde(rename = "borrowAPY")]
    pub borrow_apy: f64,
    pub risk: RiskTier,
    /// Supplied over borrowed; `None` when nothing is borrowed.
    pub coverage: Option<f64>,
}

impl ReserveMetrics {
    pub fn from_snapshot(snapshot: &ReserveSnapshot, decimals: u8) -> Self {
        let available = to_f64(snapshot.available_liquidity, decimals);
        let borrowed = to_f64(snapshot.total_borrowed(), decimals);
        let utilization = utilization_percent(available, borrowed);

        Self {
            utilization,
            supply_apy: ray_to_percent(snapshot.liquidity_rate),
            borrow_apy: ray_to_percent(snapshot.variable_borrow_rate),
            risk: RiskTier::for_utilization(utilization),
            coverage: (borrowed > 0.0).then(|| (available + borrowed) / borrowed),
        }
    }
}

/// `borrowed / (available + borrowed) * 100`, 0 for an empty reserve.
pub fn utilization_percent(available: f64, borrowed: f64) -> f64 {
    let supplied = available + borrowed;
    if supplied <= 0.0 || supplied.is_nan() {
        return 0.0;
    }
    (borrowed * 100.0 / supplied).clamp(0.0, 100.0)
}

/// `GET /reserves` item: asset metadata, normalized amounts and derived metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveView {
    pub asset: Asset,
    pub available_liquidity: String,
    pub total_variable_debt: String,
    pub total_stable_debt: String,
    #[serde(rename = "liquidityRatePercent")]
    pub liquidity_rate: f64,
    #[serde(rename = "variableBorrowRatePercent")]
    pub variable_borrow_rate: f64,
    #[serde(rename = "stableBorrowRatePercent")]
    pub stable_borrow_rate: f64,
    pub liquidity_index: String,
    pub variable_borrow_index: String,
    pub last_update_timestamp: u64,
    #[serde(flatten)]
    pub metrics: ReserveMetrics,
}

impl ReserveView {
    pub fn new(asset: Asset, snapshot: &ReserveSnapshot) -> Self {
        let decimals = asset.decimals;
        Self {
            available_liquidity: format_units(snapshot.available_liquidity, decimals),
            total_variable_debt: format_units(snapshot.total_variable_debt, decimals),
            total_stable_debt: format_units(snapshot.total_stable_debt, decimals),
            liquidity_rate: ray_to_percent(snapshot.liquidity_rate),
            variable_borrow_rate: ray_to_percent(snapshot.variable_borrow_rate),
            stable_borrow_rate: ray_to_percent(snapshot.stable_borrow_rate),
            liquidity_index: snapshot.liquidity_index.to_string(),
            variable_borrow_index: snapshot.variable_borrow_index.to_string(),
            last_update_timestamp: snapshot.last_update_timestamp,
            metrics: ReserveMetrics::from_snapshot(snapshot, decimals),
            asset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvlPoint {
    /// Short label, e.g. "Oct 18".
    pub date: String,
    pub tvl: f64,
    pub deposits: f64,
    pub borrows: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationEntry {
    pub asset: String,
    pub utilization: f64,
    pub apy: f64,
    pub borrow: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntry {
    pub reserve: String,
    pub utilization: f64,
    pub threshold: u32,
    pub coverage: Option<f64>,
    pub risk: RiskTier,
}

/// Sums of token amounts across reserves. No prices are applied, so these
/// are indicators rather than currency values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTotals {
    pub total_supplied: f64,
    pub total_borrowed: f64,
    pub unit: &'static str,
    pub reserve_count: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub tvl_data: Vec<TvlPoint>,
    pub tvl_data_is_placeholder: bool,
    pub utilization_data: Vec<UtilizationEntry>,
    pub risk_metrics: Vec<RiskEntry>,
    pub metrics: AnalyticsTotals,
}
