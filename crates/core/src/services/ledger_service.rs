use chrono::NaiveDate;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::etf::EtfReference;
use crate::models::holding::{HoldingLedger, Portfolio};
use crate::models::transaction::Transaction;
use crate::services::calculator::whole_lot_shares;

/// Manages holdings and their buy transactions.
///
/// Pure business logic with no I/O. Derived figures live on
/// [`HoldingLedger`] and are recomputed from the transactions every time.
pub struct LedgerService {
    lot_size: u64,
}

impl LedgerService {
    pub fn new(lot_size: u64) -> Self {
        Self { lot_size }
    }

    pub fn lot_size(&self) -> u64 {
        self.lot_size
    }

    /// Add an ETF to the portfolio with one seed transaction sized to the
    /// largest whole-lot position `budget` can buy at the reference price.
    ///
    /// Rejects a non-positive price (no cost basis), a code that is
    /// already held, and a budget too small for a single lot.
    pub fn seed(
        &self,
        portfolio: &mut Portfolio,
        etf: &EtfReference,
        budget: f64,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        if etf.price_recent <= 0.0 || !etf.price_recent.is_finite() {
            return Err(CoreError::InvalidCostBasis {
                code: etf.code.clone(),
                price: etf.price_recent,
            });
        }
        if portfolio.contains(&etf.code) {
            return Err(CoreError::DuplicateHolding(etf.code.clone()));
        }

        let shares = whole_lot_shares(budget, etf.price_recent, self.lot_size);
        if shares == 0 {
            return Err(CoreError::ValidationError(format!(
                "A budget of {budget} cannot buy one lot of {} at {}",
                etf.code, etf.price_recent
            )));
        }

        let seed = Transaction::new(date, shares, etf.price_recent);
        info!(code = %etf.code, shares, price = etf.price_recent, "seeded holding");
        portfolio
            .holdings
            .push(HoldingLedger::new(etf.code.clone(), etf.name.clone(), seed));
        Ok(())
    }

    /// Append a buy to an existing holding. Earlier transactions are untouched.
    pub fn append_transaction(
        &self,
        portfolio: &mut Portfolio,
        code: &str,
        date: NaiveDate,
        shares: u64,
        price: f64,
    ) -> Result<(), CoreError> {
        self.validate_trade(shares, price)?;
        let ledger = portfolio
            .get_mut(code)
            .ok_or_else(|| CoreError::HoldingNotFound(code.to_string()))?;
        ledger.transactions.push(Transaction::new(date, shares, price));
        debug!(code = %ledger.code, shares, price, count = ledger.transactions.len(), "appended transaction");
        Ok(())
    }

    /// Replace a holding's entire history with one corrective transaction.
    ///
    /// Used to fix entry mistakes or to resync with a broker statement.
    /// The discarded transactions cannot be recovered.
    pub fn overwrite_position(
        &self,
        portfolio: &mut Portfolio,
        code: &str,
        date: NaiveDate,
        shares: u64,
        price: f64,
    ) -> Result<(), CoreError> {
        self.validate_trade(shares, price)?;
        self.replace_history(portfolio, code, Transaction::new(date, shares, price))
    }

    /// Collapse a holding's history into one transaction carrying the
    /// current totals. Share count, total cost and average cost are kept.
    pub fn consolidate(
        &self,
        portfolio: &mut Portfolio,
        code: &str,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        let ledger = portfolio
            .get(code)
            .ok_or_else(|| CoreError::HoldingNotFound(code.to_string()))?;
        let corrective = Transaction::from_totals(
            date,
            ledger.total_shares(),
            ledger.total_fees(),
            ledger.total_cost(),
        );
        self.replace_history(portfolio, code, corrective)
    }

    /// Delete the holding for `code`.
    pub fn remove(&self, portfolio: &mut Portfolio, code: &str) -> Result<HoldingLedger, CoreError> {
        let wanted = code.trim().to_uppercase();
        let idx = portfolio
            .holdings
            .iter()
            .position(|h| h.code == wanted)
            .ok_or_else(|| CoreError::HoldingNotFound(code.to_string()))?;
        let removed = portfolio.holdings.remove(idx);
        info!(code = %removed.code, "removed holding");
        Ok(removed)
    }

    fn replace_history(
        &self,
        portfolio: &mut Portfolio,
        code: &str,
        corrective: Transaction,
    ) -> Result<(), CoreError> {
        let ledger = portfolio
            .get_mut(code)
            .ok_or_else(|| CoreError::HoldingNotFound(code.to_string()))?;
        let discarded = ledger.transactions.len();
        ledger.transactions = vec![corrective];
        info!(code = %ledger.code, discarded, "overwrote position");
        Ok(())
    }

    /// Rules for a manually entered trade:
    /// - shares must be a positive multiple of the lot size
    /// - price must be a positive, finite number
    fn validate_trade(&self, shares: u64, price: f64) -> Result<(), CoreError> {
        if shares == 0 || shares % self.lot_size != 0 {
            return Err(CoreError::ValidationError(format!(
                "Share count must be a positive multiple of {} (got {shares})",
                self.lot_size
            )));
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(CoreError::ValidationError(format!(
                "Price must be positive (got {price})"
            )));
        }
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new(1000)
    }
}
