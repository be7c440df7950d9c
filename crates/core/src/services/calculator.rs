//! Stateless trading arithmetic.

/// Brokerage commission rate (0.1425 %).
pub const COMMISSION_RATE: f64 = 0.001425;

/// Minimum commission per order, in TWD.
pub const MIN_COMMISSION: u64 = 20;

/// Commission for buying `shares` at `price`.
///
/// The raw commission is truncated (not rounded) to whole TWD, then
/// raised to [`MIN_COMMISSION`] if it falls below it.
pub fn brokerage_fee(price: f64, shares: u64) -> u64 {
    let raw = (price * shares as f64 * COMMISSION_RATE).floor();
    if raw.is_nan() || raw < MIN_COMMISSION as f64 {
        MIN_COMMISSION
    } else {
        raw as u64
    }
}

/// Annualised cash yield in percent: `annual_dividend / price × 100`.
///
/// Returns 0.0 unless both inputs are positive.
pub fn estimate_yield(price: f64, annual_dividend: f64) -> f64 {
    if price > 0.0 && annual_dividend > 0.0 {
        annual_dividend / price * 100.0
    } else {
        0.0
    }
}

/// Largest whole-lot share count affordable within `budget` at `price`.
///
/// Returns 0 for a non-positive price or lot size.
pub fn whole_lot_shares(budget: f64, price: f64, lot_size: u64) -> u64 {
    if price <= 0.0 || lot_size == 0 || budget <= 0.0 {
        return 0;
    }
    let lots = (budget / (price * lot_size as f64)).floor();
    lots as u64 * lot_size
}

