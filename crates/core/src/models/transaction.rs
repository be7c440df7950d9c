use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::calculator::brokerage_fee;

/// A single buy of an ETF.
///
/// Transactions are immutable once created. A holding's history only ever
/// grows by appending, or is replaced wholesale by an overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// Trade date (daily granularity)
    pub date: NaiveDate,

    /// Number of shares bought
    pub shares: u64,

    /// Execution price per share
    pub price: f64,

    /// Brokerage commission charged
    pub fee: u64,

    /// price × shares + fee
    pub total_cost: f64,
}

impl Transaction {
    /// Create a transaction, computing the fee and total cost.
    pub fn new(date: NaiveDate, shares: u64, price: f64) -> Self {
        let fee = brokerage_fee(price, shares);
        Self {
            id: Uuid::new_v4(),
            date,
            shares,
            price,
            fee,
            total_cost: price * shares as f64 + fee as f64,
        }
    }

    /// Create a corrective transaction that carries explicit totals.
    ///
    /// The execution price is backed out of `total_cost - fee` so that
    /// `price × shares + fee == total_cost` still holds.
    pub fn from_totals(date: NaiveDate, shares: u64, fee: u64, total_cost: f64) -> Self {
        let price = if shares > 0 {
            (total_cost - fee as f64) / shares as f64
        } else {
            0.0
        };
        Self {
            id: Uuid::new_v4(),
            date,
            shares,
            price,
            fee,
            total_cost,
        }
    }

    /// Gross traded value, excluding the fee.
    pub fn gross_amount(&self) -> f64 {
        self.price * self.shares as f64
    }
}
