use thiserror::Error;

/// Unified error type for the etf-dividend-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Reference data unavailable: {0}")]
    ReferenceData(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("{code} has no usable price ({price}); cost basis cannot be computed")]
    InvalidCostBasis { code: String, price: f64 },

    #[error("{0} is already in the portfolio")]
    DuplicateHolding(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("ETF not found in reference data: {0}")]
    EtfNotFound(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::ReferenceData(format!("CSV: {e}"))
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Network(redact_query(&e.to_string()))
    }
}

/// Strip query parameters from anything that looks like a URL so that
/// credentials passed as query strings never reach logs or error text.
pub(crate) fn redact_query(msg: &str) -> String {
    if let Some(idx) = msg.find('?') {
        format!("{}?<query redacted>", &msg[..idx])
    } else {
        msg.to_string()
    }
}

/// Failure reported by a text-generation backend.
///
/// Kept separate from [`CoreError`] because the advisor never propagates
/// these: each one is mapped to a fixed advisory message.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API key rejected by {provider}")]
    Unauthorized { provider: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{provider} returned no text")]
    EmptyResponse { provider: String },
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Network(redact_query(&e.to_string()))
    }
}
