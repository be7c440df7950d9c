use crate::models::analytics::{HoldingMetrics, MonthlyProjection};
use crate::services::payout_schedule;

/// Spreads each holding's estimated annual dividend over its payout months.
///
/// For month `m`, the total is the sum over holdings paying in `m` of
/// `market_value × yield / 100 / frequency`.
pub struct ProjectionService;

impl ProjectionService {
    pub fn new() -> Self {
        Self
    }

    /// Project the twelve monthly totals.
    ///
    /// Holdings without a category (unknown to the reference data) are
    /// skipped. Zero market value contributes zero.
    pub fn project(&self, holdings: &[HoldingMetrics]) -> MonthlyProjection {
        let mut projection = MonthlyProjection::default();

        for holding in holdings {
            let Some(category) = holding.category else {
                continue;
            };
            let schedule = payout_schedule::resolve(category, &holding.code);
            let per_payout = holding.market_value * (holding.annual_yield / 100.0)
                / schedule.frequency() as f64;

            for month in schedule.months() {
                projection.totals[(month - 1) as usize] += per_payout;
            }
        }

        projection
    }
}

impl Default for ProjectionService {
    fn default() -> Self {
        Self::new()
    }
}
