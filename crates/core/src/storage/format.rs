use tracing::warn;

use crate::errors::CoreError;
use crate::models::holding::Portfolio;

/// Storage key for the portfolio. The suffix is the layout version; a
/// new layout gets a new key rather than a migration.
pub const PORTFOLIO_KEY: &str = "etf_portfolio_v2";

/// Storage key for the user's Gemini API key.
pub const CREDENTIAL_KEY: &str = "gemini_api_key";

/// Serialize the portfolio as a JSON array of holdings.
pub fn encode_portfolio(portfolio: &Portfolio) -> Result<String, CoreError> {
    serde_json::to_string(portfolio)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
}

/// Parse a stored portfolio. Absent or unparsable data yields an empty
/// portfolio; the user starts over rather than being locked out.
pub fn decode_portfolio(raw: Option<&str>) -> Portfolio {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Portfolio::new();
    };
    match serde_json::from_str::<Portfolio>(raw) {
        Ok(portfolio) => dedupe(normalize_codes(portfolio)),
        Err(e) => {
            warn!(error = %e, "stored portfolio is unreadable, starting empty");
            Portfolio::new()
        }
    }
}

/// Stored codes may carry stray case or whitespace; lookups expect the
/// trimmed uppercase form. Ledgers left without a code are dropped.
fn normalize_codes(mut portfolio: Portfolio) -> Portfolio {
    for ledger in &mut portfolio.holdings {
        ledger.code = ledger.code.trim().to_uppercase();
    }
    let before = portfolio.holdings.len();
    portfolio.holdings.retain(|h| !h.code.is_empty());
    if portfolio.holdings.len() != before {
        warn!(dropped = before - portfolio.holdings.len(), "dropped stored holdings with no code");
    }
    portfolio
}

/// Keep the first ledger for each code; stored data may predate that rule.
fn dedupe(mut portfolio: Portfolio) -> Portfolio {
    let before = portfolio.holdings.len();
    let mut seen = std::collections::HashSet::new();
    portfolio.holdings.retain(|h| seen.insert(h.code.clone()));
    if portfolio.holdings.len() != before {
        warn!(dropped = before - portfolio.holdings.len(), "dropped duplicate holdings from stored portfolio");
    }
    portfolio
}
