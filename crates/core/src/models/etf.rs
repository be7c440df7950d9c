use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Distribution category of a listed ETF.
///
/// Quarterly funds are split by the month their first payout falls in.
/// Bond funds have their own per-code schedules, see
/// [`crate::services::payout_schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// 季一: pays in January, April, July, October
    #[serde(rename = "季一")]
    QuarterlyPhase1,
    /// 季二: pays in February, May, August, November
    #[serde(rename = "季二")]
    QuarterlyPhase2,
    /// 季三: pays in March, June, September, December
    #[serde(rename = "季三")]
    QuarterlyPhase3,
    /// 月配: pays every month
    #[serde(rename = "月配")]
    Monthly,
    /// 債券: bond fund, schedule depends on the ticker
    #[serde(rename = "債券")]
    Bond,
}

impl Category {
    /// All categories in the order the browsing views list them.
    pub const ALL: [Category; 5] = [
        Category::QuarterlyPhase1,
        Category::QuarterlyPhase2,
        Category::QuarterlyPhase3,
        Category::Monthly,
        Category::Bond,
    ];

    /// The label used by the reference dataset.
    pub fn label(&self) -> &'static str {
        match self {
            Category::QuarterlyPhase1 => "季一",
            Category::QuarterlyPhase2 => "季二",
            Category::QuarterlyPhase3 => "季三",
            Category::Monthly => "月配",
            Category::Bond => "債券",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "季一" => Ok(Category::QuarterlyPhase1),
            "季二" => Ok(Category::QuarterlyPhase2),
            "季三" => Ok(Category::QuarterlyPhase3),
            "月配" => Ok(Category::Monthly),
            "債券" => Ok(Category::Bond),
            other => match other.to_ascii_lowercase().as_str() {
                "q1" => Ok(Category::QuarterlyPhase1),
                "q2" => Ok(Category::QuarterlyPhase2),
                "q3" => Ok(Category::QuarterlyPhase3),
                "m" | "monthly" => Ok(Category::Monthly),
                "b" | "bond" => Ok(Category::Bond),
                _ => Err(CoreError::ValidationError(format!(
                    "Unknown category '{s}' (expected 季一/季二/季三/月配/債券 or Q1/Q2/Q3/monthly/bond)"
                ))),
            },
        }
    }
}

/// One announced or historical distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    /// Ex-dividend date
    pub ex_date: NaiveDate,

    /// Payment date
    pub pay_date: NaiveDate,

    /// Cash paid per unit (TWD)
    pub amount: f64,
}

/// Reference data for one tradable ETF.
///
/// Supplied externally (see [`crate::providers`]) and only ever looked up
/// by `code`; nothing in the core mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfReference {
    /// Ticker code, e.g. "0056" or "00679B"
    pub code: String,

    /// Display name
    pub name: String,

    pub category: Category,

    /// Fund issuer
    #[serde(default)]
    pub issuer: String,

    /// Fund type as published (e.g. "高股息", "投資等級債")
    #[serde(default)]
    pub fund_type: String,

    /// Price at the start of the tracking period (or at listing)
    #[serde(default)]
    pub price_start: f64,

    /// Most recent price. Zero means no quote was available.
    pub price_recent: f64,

    /// Trailing annual yield, percent
    pub annual_yield: f64,

    /// Estimated forward yield, percent
    #[serde(default)]
    pub est_yield: f64,

    /// Price return over the tracking period, percent
    #[serde(default)]
    pub return_rate: f64,

    /// Total return including distributions, percent
    #[serde(default)]
    pub return_rate_with_div: f64,

    #[serde(default)]
    pub issue_date: Option<NaiveDate>,

    #[serde(default)]
    pub dividend_history: Vec<DividendRecord>,
}

impl EtfReference {
    /// Minimal constructor; descriptive fields are left empty.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        price_recent: f64,
        annual_yield: f64,
    ) -> Self {
        Self {
            code: code.into().trim().to_uppercase(),
            name: name.into(),
            category,
            issuer: String::new(),
            fund_type: String::new(),
            price_start: price_recent,
            price_recent,
            annual_yield,
            est_yield: annual_yield,
            return_rate: 0.0,
            return_rate_with_div: 0.0,
            issue_date: None,
            dividend_history: Vec::new(),
        }
    }

    /// Whether the dataset carries a usable quote for this ETF.
    pub fn has_quote(&self) -> bool {
        self.price_recent > 0.0
    }
}
