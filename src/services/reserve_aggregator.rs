use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, warn};

use crate::models::{
    AnalyticsReport, AnalyticsTotals, Asset, AssetRegistry, ReserveMetrics, ReserveSnapshot, ReserveView, RiskEntry,
    UtilizationEntry, UTILIZATION_THRESHOLD_PERCENT,
};
use crate::services::protocol_data::ProtocolDataService;
use crate::services::tvl_series;
use crate::utils::fixed_point::{round_to, to_f64};

/// Label for the unpriced analytics totals.
pub const TOTALS_UNIT: &str = "token units (unpriced)";

/// Fans out reserve reads across the registry and derives dashboard metrics.
pub struct ReserveAggregator {
    data: Arc<ProtocolDataService>,
    registry: Arc<AssetRegistry>,
}

impl ReserveAggregator {
    pub fn new(data: Arc<ProtocolDataService>, registry: Arc<AssetRegistry>) -> Self {
        Self { data, registry }
    }

    /// One read per registered asset, awaited jointly. Assets whose read fails
    /// are logged and left out.
    pub async fn fetch_reserves(&self) -> Vec<(Asset, ReserveSnapshot)> {
        let reads = self.registry.assets().iter().map(|asset| async move {
            let result = self.data.reserve(asset.address).await;
            (asset, result)
        });

        let results = join_all(reads).await;
        let total = results.len();

        let reserves: Vec<(Asset, ReserveSnapshot)> = results
            .into_iter()
            .filter_map(|(asset, result)| match result {
                Ok(snapshot) => Some((asset.clone(), snapshot)),
                Err(e) => {
                    warn!(asset = %asset.symbol, error = %e, "Dropping reserve from aggregation");
                    None
                }
            })
            .collect();

        if reserves.len() < total {
            info!(fetched = reserves.len(), total, "Partial reserve aggregation");
        }
        reserves
    }

    pub async fn reserves(&self) -> Vec<ReserveView> {
        self.fetch_reserves()
            .await
            .into_iter()
            .map(|(asset, snapshot)| ReserveView::new(asset, &snapshot))
            .collect()
    }

    pub async fn analytics(&self, now: DateTime<Utc>) -> AnalyticsReport {
        let reserves = self.fetch_reserves().await;

        let mut total_supplied = 0.0;
        let mut total_borrowed = 0.0;
        let mut utilization_data = Vec::with_capacity(reserves.len());
        let mut risk_metrics = Vec::with_capacity(reserves.len());

        for (asset, snapshot) in &reserves {
            let available = to_f64(snapshot.available_liquidity, asset.decimals);
            let borrowed = to_f64(snapshot.total_borrowed(), asset.decimals);
            total_supplied += available + borrowed;
            total_borrowed += borrowed;

            let metrics = ReserveMetrics::from_snapshot(snapshot, asset.decimals);

            utilization_data.push(UtilizationEntry {
                asset: asset.symbol.clone(),
                utilization: metrics.utilization,
                apy: metrics.supply_apy,
                borrow: metrics.borrow_apy,
            });

            risk_metrics.push(RiskEntry {
                reserve: asset.symbol.clone(),
                utilization: metrics.utilization.round(),
                threshold: UTILIZATION_THRESHOLD_PERCENT,
                coverage: metrics.coverage.map(|c| round_to(c, 2)),
                risk: metrics.risk,
            });
        }

        AnalyticsReport {
            tvl_data: tvl_series::generate(total_supplied, total_borrowed, now.date_naive()),
            tvl_data_is_placeholder: true,
            utilization_data,
            risk_metrics,
            metrics: AnalyticsTotals {
                total_supplied: round_to(total_supplied, 2),
                total_borrowed: round_to(total_borrowed, 2),
                unit: TOTALS_UNIT,
                reserve_count: reserves.len(),
                generated_at: now,
            },
        }
    }
}
