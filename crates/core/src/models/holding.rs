use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// All buys of one ETF, in the order they were entered.
///
/// Insertion order is entry order, not trade-date order. Totals are
/// derived from the transactions on every call and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingLedger {
    /// Ticker code, uppercased
    pub code: String,

    /// Display name captured when the holding was added
    pub name: String,

    pub transactions: Vec<Transaction>,
}

impl HoldingLedger {
    pub fn new(code: impl Into<String>, name: impl Into<String>, seed: Transaction) -> Self {
        Self {
            code: code.into().trim().to_uppercase(),
            name: name.into(),
            transactions: vec![seed],
        }
    }

    pub fn total_shares(&self) -> u64 {
        self.transactions.iter().map(|t| t.shares).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.transactions.iter().map(|t| t.total_cost).sum()
    }

    pub fn total_fees(&self) -> u64 {
        self.transactions.iter().map(|t| t.fee).sum()
    }

    /// Weighted-average cost per share, fees included. Zero when empty.
    pub fn average_cost(&self) -> f64 {
        let shares = self.total_shares();
        if shares == 0 {
            0.0
        } else {
            self.total_cost() / shares as f64
        }
    }
}

/// The user's simulated portfolio: one ledger per ETF code.
///
/// Serialized as a bare JSON array of ledgers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    pub holdings: Vec<HoldingLedger>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&HoldingLedger> {
        let code = code.trim().to_uppercase();
        self.holdings.iter().find(|h| h.code == code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut HoldingLedger> {
        let code = code.trim().to_uppercase();
        self.holdings.iter_mut().find(|h| h.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
