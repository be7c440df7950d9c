use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::etf::{Category, DividendRecord, EtfReference};
use super::traits::ReferenceDataProvider;

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSource {
    /// Published over HTTP(S)
    Url(String),
    /// A file on disk (native only)
    Path(std::path::PathBuf),
}

impl CsvSource {
    /// Treat anything starting with `http://` or `https://` as a URL,
    /// everything else as a file path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            CsvSource::Url(trimmed.to_string())
        } else {
            CsvSource::Path(trimmed.into())
        }
    }
}

/// Reference dataset published as CSV.
///
/// Expected header:
/// ```text
/// code,name,category,issuer,type,price_start,price_recent,yield,est_yield,
/// return_rate,return_rate_with_div,issue_date,dividends
/// ```
/// `dividends` lists `ex|pay|amount` triples separated by `;`.
/// Dates may be written `YYYY/MM/DD` or `YYYY-MM-DD`. Rows that fail to
/// parse are skipped with a warning instead of failing the whole load.
pub struct CsvFeedProvider {
    source: CsvSource,
    client: Client,
}

impl CsvFeedProvider {
    pub fn new(source: CsvSource) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            source,
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn from_location(location: &str) -> Self {
        Self::new(CsvSource::parse(location))
    }

    pub fn source(&self) -> &CsvSource {
        &self.source
    }

    async fn read_text(&self) -> Result<String, CoreError> {
        match &self.source {
            CsvSource::Url(url) => {
                let resp = self.client.get(url).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(CoreError::Api {
                        provider: self.name().into(),
                        message: format!("HTTP {status} while fetching reference data"),
                    });
                }
                Ok(resp.text().await?)
            }
            #[cfg(not(target_arch = "wasm32"))]
            CsvSource::Path(path) => Ok(std::fs::read_to_string(path)?),
            #[cfg(target_arch = "wasm32")]
            CsvSource::Path(path) => Err(CoreError::ReferenceData(format!(
                "file sources are not available on this platform: {}",
                path.display()
            ))),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ReferenceDataProvider for CsvFeedProvider {
    fn name(&self) -> &str {
        "CSV feed"
    }

    async fn fetch_all(&self) -> Result<Vec<EtfReference>, CoreError> {
        let text = self.read_text().await?;
        let etfs = parse_reference_csv(&text)?;
        info!(count = etfs.len(), "loaded reference data");
        Ok(etfs)
    }
}

// ── CSV row layout ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CsvRow {
    code: String,
    name: String,
    category: String,
    #[serde(default)]
    issuer: String,
    #[serde(default, rename = "type")]
    fund_type: String,
    #[serde(default)]
    price_start: Option<f64>,
    #[serde(default)]
    price_recent: Option<f64>,
    #[serde(default, rename = "yield")]
    annual_yield: Option<f64>,
    #[serde(default)]
    est_yield: Option<f64>,
    #[serde(default)]
    return_rate: Option<f64>,
    #[serde(default)]
    return_rate_with_div: Option<f64>,
    #[serde(default)]
    issue_date: String,
    #[serde(default)]
    dividends: String,
}

/// Parse the whole CSV document. Only a malformed header is fatal.
pub fn parse_reference_csv(text: &str) -> Result<Vec<EtfReference>, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    reader.headers()?;

    let mut etfs: Vec<EtfReference> = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let parsed = row
            .map_err(CoreError::from)
            .and_then(into_reference);
        match parsed {
            Ok(etf) if etfs.iter().any(|e| e.code == etf.code) => {
                warn!(row = line + 2, code = %etf.code, "duplicate code in reference data, keeping first");
            }
            Ok(etf) => etfs.push(etf),
            Err(e) => warn!(row = line + 2, error = %e, "skipping invalid reference row"),
        }
    }
    Ok(etfs)
}

fn into_reference(row: CsvRow) -> Result<EtfReference, CoreError> {
    let code = row.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(CoreError::ReferenceData("empty code".into()));
    }
    let category: Category = row.category.parse()?;
    let issue_date = if row.issue_date.trim().is_empty() {
        None
    } else {
        Some(parse_date(&row.issue_date)?)
    };
    let price_recent = row.price_recent.unwrap_or(0.0);
    let annual_yield = row.annual_yield.unwrap_or(0.0);

    Ok(EtfReference {
        code,
        name: row.name,
        category,
        issuer: row.issuer,
        fund_type: row.fund_type,
        price_start: row.price_start.unwrap_or(0.0),
        price_recent,
        annual_yield,
        est_yield: row.est_yield.unwrap_or(annual_yield),
        return_rate: row.return_rate.unwrap_or(0.0),
        return_rate_with_div: row.return_rate_with_div.unwrap_or(0.0),
        issue_date,
        dividend_history: parse_dividends(&row.dividends)?,
    })
}

fn parse_dividends(field: &str) -> Result<Vec<DividendRecord>, CoreError> {
    field
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split('|').map(str::trim).collect();
            let [ex, pay, amount] = parts.as_slice() else {
                return Err(CoreError::ReferenceData(format!(
                    "dividend entry '{entry}' must be ex|pay|amount"
                )));
            };
            let amount: f64 = amount.parse().map_err(|_| {
                CoreError::ReferenceData(format!("invalid dividend amount '{amount}'"))
            })?;
            Ok(DividendRecord {
                ex_date: parse_date(ex)?,
                pay_date: parse_date(pay)?,
                amount,
            })
        })
        .collect()
}

/// Accepts `YYYY/MM/DD` and `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| CoreError::ReferenceData(format!("invalid date '{s}'")))
}
