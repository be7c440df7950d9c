use std::fmt::Write as _;
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::models::etf::EtfReference;
use crate::models::holding::Portfolio;
use crate::providers::traits::TextGenerator;

/// What the advisor was asked to produce. Selects the advisory wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorTask {
    SmartPlan,
    Diagnosis,
}

/// Why no generated text is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisorFailure {
    /// No API key configured; no request was made.
    MissingCredential,
    /// The backend rejected the API key.
    InvalidCredential,
    /// The backend answered without any text.
    EmptyResponse,
    /// Network or service failure; retrying later may help.
    Unavailable,
}

impl AdvisorFailure {
    /// Fixed, user-readable message shown instead of generated text.
    pub fn advisory(&self, task: AdvisorTask) -> &'static str {
        match (self, task) {
            (AdvisorFailure::MissingCredential, AdvisorTask::SmartPlan) => {
                "⚠️ AI 規劃功能尚未啟用：請先設定 Gemini API Key。"
            }
            (AdvisorFailure::MissingCredential, AdvisorTask::Diagnosis) => {
                "⚠️ 需要 Gemini API Key 才能進行持股健檢，請先設定。"
            }
            (AdvisorFailure::InvalidCredential, _) => {
                "⚠️ API Key 無效或已被停用，請確認後重新設定。"
            }
            (AdvisorFailure::EmptyResponse, AdvisorTask::SmartPlan) => "無法產生建議。",
            (AdvisorFailure::EmptyResponse, AdvisorTask::Diagnosis) => "無法產生診斷。",
            (AdvisorFailure::Unavailable, AdvisorTask::SmartPlan) => {
                "AI 服務暫時無法使用，請稍後再試，或檢查 API 額度是否足夠。"
            }
            (AdvisorFailure::Unavailable, AdvisorTask::Diagnosis) => {
                "AI 診斷服務暫時無法使用，請稍後再試。"
            }
        }
    }
}

impl From<&GenerationError> for AdvisorFailure {
    fn from(e: &GenerationError) -> Self {
        match e {
            GenerationError::Unauthorized { .. } => AdvisorFailure::InvalidCredential,
            GenerationError::EmptyResponse { .. } => AdvisorFailure::EmptyResponse,
            GenerationError::Api { .. } | GenerationError::Network(_) => AdvisorFailure::Unavailable,
        }
    }
}

/// Outcome of an advisor call. Never an error: failures carry their advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisorOutcome {
    Text(String),
    Failed { task: AdvisorTask, failure: AdvisorFailure },
}

impl AdvisorOutcome {
    /// The text to show: generated text, or the failure's advisory.
    pub fn message(&self) -> &str {
        match self {
            AdvisorOutcome::Text(text) => text,
            AdvisorOutcome::Failed { task, failure } => failure.advisory(*task),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AdvisorOutcome::Text(_))
    }
}

/// Builds planning and diagnosis prompts and sends them to a [`TextGenerator`].
///
/// One request per call: no retry and no timeout. The user retries by
/// asking again.
pub struct AdvisorService {
    generator: Box<dyn TextGenerator>,
}

impl AdvisorService {
    pub fn new(generator: Box<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask for an allocation of `budget_wan` (units of 10 000 TWD) across
    /// the quoted ETFs, honouring the user's free-text `constraints`.
    pub async fn smart_plan(
        &self,
        api_key: Option<&str>,
        budget_wan: f64,
        constraints: &str,
        etfs: &[EtfReference],
    ) -> AdvisorOutcome {
        let prompt = build_plan_prompt(budget_wan, constraints, etfs);
        self.run(AdvisorTask::SmartPlan, api_key, &prompt).await
    }

    /// Ask for a health check of the current holdings.
    pub async fn diagnose(&self, api_key: Option<&str>, portfolio: &Portfolio) -> AdvisorOutcome {
        let prompt = build_diagnosis_prompt(portfolio);
        self.run(AdvisorTask::Diagnosis, api_key, &prompt).await
    }

    async fn run(&self, task: AdvisorTask, api_key: Option<&str>, prompt: &str) -> AdvisorOutcome {
        let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            info!(?task, "no API key configured, skipping generation");
            return AdvisorOutcome::Failed {
                task,
                failure: AdvisorFailure::MissingCredential,
            };
        };

        match self.generator.generate(api_key, prompt).await {
            Ok(text) if !text.trim().is_empty() => AdvisorOutcome::Text(text),
            Ok(_) => AdvisorOutcome::Failed {
                task,
                failure: AdvisorFailure::EmptyResponse,
            },
            Err(e) => {
                warn!(?task, provider = self.generator.name(), error = %e, "text generation failed");
                AdvisorOutcome::Failed {
                    task,
                    failure: AdvisorFailure::from(&e),
                }
            }
        }
    }
}

/// Planning prompt. Only ETFs with a quote are offered, so the model
/// cannot recommend a fund nobody can price.
pub fn build_plan_prompt(budget_wan: f64, constraints: &str, etfs: &[EtfReference]) -> String {
    let mut listing = String::new();
    for etf in etfs.iter().filter(|e| e.has_quote()) {
        let _ = writeln!(
            listing,
            "- {} {} (Type: {}, Yield: {}%)",
            etf.code, etf.name, etf.category, etf.annual_yield
        );
    }

    format!(
        "你是一位台灣 ETF 投資專家。用戶預算 {budget_wan} 萬。需求: \"{}\"。\n\
         請嚴格從以下標的中選擇 (僅包含目前有報價的標的):\n\
         {listing}\
         請輸出一個 Markdown 表格，包含：標的、配置、金額、投資理由。",
        constraints.trim()
    )
}

/// Diagnosis prompt listing each holding as `CODE NAME`.
pub fn build_diagnosis_prompt(portfolio: &Portfolio) -> String {
    let summary = portfolio
        .holdings
        .iter()
        .map(|h| format!("{} {}", h.code, h.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("分析此台灣 ETF 組合: [{summary}]。請提供診斷表格：檢查項目、現狀分析、優化建議。")
}
