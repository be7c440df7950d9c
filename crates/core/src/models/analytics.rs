use serde::{Deserialize, Serialize};

use super::etf::Category;

/// Derived figures for one holding. Recomputed from the ledger and the
/// reference data on every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingMetrics {
    /// Ticker code
    pub code: String,

    /// Display name from the ledger
    pub name: String,

    /// Distribution category, `None` when the code is not in the reference data
    pub category: Option<Category>,

    /// Sum of shares over all transactions
    pub total_shares: u64,

    /// Sum of total cost (fees included) over all transactions
    pub total_cost: f64,

    /// total_cost / total_shares, 0 when no shares
    pub average_cost: f64,

    /// Annual yield (percent) used for the dividend estimate
    pub annual_yield: f64,

    /// total_shares × most recent reference price
    pub market_value: f64,

    /// market_value × annual_yield / 100
    pub estimated_annual_dividend: f64,
}

impl HoldingMetrics {
    /// Holding size in lots of `lot_size` shares (may be fractional).
    pub fn lots(&self, lot_size: u64) -> f64 {
        if lot_size == 0 {
            return 0.0;
        }
        self.total_shares as f64 / lot_size as f64
    }
}

/// Expected dividend cash flow per calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyProjection {
    /// Index 0 is January
    pub totals: [f64; 12],
}

impl MonthlyProjection {
    /// Expected total for `month` (1..=12). Out-of-range months yield 0.
    pub fn for_month(&self, month: u32) -> f64 {
        if (1..=12).contains(&month) {
            self.totals[(month - 1) as usize]
        } else {
            0.0
        }
    }

    /// Totals truncated to whole currency units, as displayed.
    pub fn display_totals(&self) -> [u64; 12] {
        self.totals.map(|v| if v > 0.0 { v.floor() as u64 } else { 0 })
    }

    /// Sum over all twelve months.
    pub fn annual_total(&self) -> f64 {
        self.totals.iter().sum()
    }

    /// `(month, total)` pairs, month numbered from 1.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.totals
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1, *v))
    }
}

/// Read-only view of the whole portfolio handed to the display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Sum of total cost across holdings
    pub total_investment: f64,

    /// Sum of estimated annual dividend across holdings
    pub total_estimated_dividend: f64,

    /// Per-holding figures, in portfolio order
    pub holdings: Vec<HoldingMetrics>,

    /// Month-by-month expected dividends
    pub monthly: MonthlyProjection,
}

impl PortfolioSnapshot {
    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Total market value of all holdings.
    pub fn total_market_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.market_value).sum()
    }
}
