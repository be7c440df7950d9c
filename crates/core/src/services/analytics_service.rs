use std::collections::HashMap;

use crate::models::analytics::{HoldingMetrics, PortfolioSnapshot};
use crate::models::etf::EtfReference;
use crate::models::holding::{HoldingLedger, Portfolio};

use super::projection_service::ProjectionService;

/// Yield (percent) assumed for a holding whose code is missing from the
/// reference data. Its market value is zero in that case, so the
/// estimate is zero either way; the figure is only shown.
pub const DEFAULT_ANNUAL_YIELD: f64 = 5.0;

/// Builds the portfolio snapshot shown to the user.
///
/// Every call recomputes all figures from the ledgers and the reference
/// data, so totals and per-holding values always agree.
pub struct AnalyticsService {
    projection_service: ProjectionService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            projection_service: ProjectionService::new(),
        }
    }

    /// Derived metrics for one holding.
    pub fn holding_metrics(
        &self,
        ledger: &HoldingLedger,
        reference: Option<&EtfReference>,
    ) -> HoldingMetrics {
        let total_shares = ledger.total_shares();
        let price = reference.map(|r| r.price_recent).unwrap_or(0.0);
        let annual_yield = reference
            .map(|r| r.annual_yield)
            .unwrap_or(DEFAULT_ANNUAL_YIELD);
        let market_value = total_shares as f64 * price;

        HoldingMetrics {
            code: ledger.code.clone(),
            name: ledger.name.clone(),
            category: reference.map(|r| r.category),
            total_shares,
            total_cost: ledger.total_cost(),
            average_cost: ledger.average_cost(),
            annual_yield,
            market_value,
            estimated_annual_dividend: market_value * (annual_yield / 100.0),
        }
    }

    /// Full snapshot: per-holding metrics, totals and the monthly projection.
    pub fn snapshot(&self, portfolio: &Portfolio, etfs: &[EtfReference]) -> PortfolioSnapshot {
        let by_code: HashMap<&str, &EtfReference> =
            etfs.iter().map(|e| (e.code.as_str(), e)).collect();

        let holdings: Vec<HoldingMetrics> = portfolio
            .holdings
            .iter()
            .map(|ledger| self.holding_metrics(ledger, by_code.get(ledger.code.as_str()).copied()))
            .collect();

        let total_investment = holdings.iter().map(|h| h.total_cost).sum();
        let total_estimated_dividend = holdings.iter().map(|h| h.estimated_annual_dividend).sum();
        let monthly = self.projection_service.project(&holdings);

        PortfolioSnapshot {
            total_investment,
            total_estimated_dividend,
            holdings,
            monthly,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
