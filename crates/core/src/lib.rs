pub mod clock;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{info, warn};

use clock::{Clock, SystemClock};
use errors::CoreError;
use models::{
    analytics::{HoldingMetrics, MonthlyProjection, PortfolioSnapshot},
    etf::{Category, EtfReference},
    holding::{HoldingLedger, Portfolio},
    settings::Settings,
};
use providers::{gemini::GeminiClient, traits::{ReferenceDataProvider, TextGenerator}};
use services::{
    advisor_service::{AdvisorOutcome, AdvisorService},
    analytics_service::AnalyticsService,
    announcement_service::{self, Announcement},
    ledger_service::LedgerService,
    removal_guard::{RemovalDecision, RemovalGuard},
};
use storage::{manager::StorageManager, store::KeyValueStore};

/// Main entry point for the ETF dividend planner core.
///
/// Owns the portfolio, the reference data, the API credential and every
/// service that operates on them. Frontends hold one of these and read
/// [`DividendPlanner::snapshot`] for display.
///
/// Each portfolio mutation runs against a working copy, is saved through
/// the storage layer, and only then replaces the live portfolio. A failed
/// save leaves the in-memory state untouched.
#[must_use]
pub struct DividendPlanner {
    portfolio: Portfolio,
    etfs: Vec<EtfReference>,
    credential: Option<SecretString>,
    settings: Settings,
    storage: StorageManager,
    ledger_service: LedgerService,
    analytics_service: AnalyticsService,
    advisor_service: AdvisorService,
    removal_guard: RemovalGuard,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DividendPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DividendPlanner")
            .field("holdings", &self.portfolio.len())
            .field("etfs", &self.etfs.len())
            .field("has_api_key", &self.credential.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

impl DividendPlanner {
    /// Open the planner over `store` with the system clock and the
    /// Gemini backend configured in `settings`.
    pub fn open(settings: Settings, store: Box<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let generator = Box::new(GeminiClient::from_settings(&settings.ai));
        Self::open_with(settings, store, Arc::new(SystemClock), generator)
    }

    /// Open with an explicit clock and text backend.
    pub fn open_with(
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        generator: Box<dyn TextGenerator>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let removal_window = settings.removal_window()?;
        let storage = StorageManager::new(store);
        let portfolio = storage.load_portfolio()?;
        let credential = storage.load_credential()?;
        info!(holdings = portfolio.len(), has_api_key = credential.is_some(), "opened planner");

        Ok(Self {
            portfolio,
            etfs: Vec::new(),
            credential,
            ledger_service: LedgerService::new(settings.lot_size),
            analytics_service: AnalyticsService::new(),
            advisor_service: AdvisorService::new(generator),
            removal_guard: RemovalGuard::new(clock.clone(), removal_window),
            settings,
            storage,
            clock,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Today's date on the planner clock. Seeded and consolidated
    /// transactions are dated with it.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ── Reference Data ──────────────────────────────────────────────

    /// Replace the reference data with whatever `provider` returns.
    ///
    /// On failure the list is left empty and the error is returned; the
    /// portfolio stays usable, valued at zero until data is loaded.
    pub async fn load_reference_data(
        &mut self,
        provider: &dyn ReferenceDataProvider,
    ) -> Result<usize, CoreError> {
        match provider.fetch_all().await {
            Ok(etfs) => {
                self.set_reference_data(etfs);
                Ok(self.etfs.len())
            }
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "reference data fetch failed");
                self.etfs.clear();
                Err(e)
            }
        }
    }

    /// Install reference data directly.
    pub fn set_reference_data(&mut self, etfs: Vec<EtfReference>) {
        self.etfs = etfs;
    }

    #[must_use]
    pub fn etfs(&self) -> &[EtfReference] {
        &self.etfs
    }

    /// ETFs of one category, in dataset order.
    #[must_use]
    pub fn etfs_in_category(&self, category: Category) -> Vec<&EtfReference> {
        self.etfs.iter().filter(|e| e.category == category).collect()
    }

    /// Look up an ETF by code (case-insensitive).
    #[must_use]
    pub fn find_etf(&self, code: &str) -> Option<&EtfReference> {
        let code = code.trim();
        self.etfs.iter().find(|e| e.code.eq_ignore_ascii_case(code))
    }

    /// Upcoming distributions across the whole dataset, nearest first.
    #[must_use]
    pub fn upcoming_dividends(&self) -> Vec<Announcement> {
        announcement_service::upcoming(&self.etfs, self.clock.today())
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add an ETF, seeded with as many whole lots as the configured
    /// target budget buys at the current reference price.
    pub fn add_holding(&mut self, code: &str) -> Result<(), CoreError> {
        let etf = self
            .find_etf(code)
            .cloned()
            .ok_or_else(|| CoreError::EtfNotFound(code.to_string()))?;
        let budget = self.settings.target_budget;
        let today = self.clock.today();
        self.mutate(|ledger, portfolio| ledger.seed(portfolio, &etf, budget, today))
    }

    /// Record another buy for a held ETF.
    pub fn append_transaction(
        &mut self,
        code: &str,
        date: NaiveDate,
        shares: u64,
        price: f64,
    ) -> Result<(), CoreError> {
        self.mutate(|ledger, portfolio| {
            ledger.append_transaction(portfolio, code, date, shares, price)
        })
    }

    /// Discard a holding's history and replace it with one corrective buy.
    pub fn overwrite_position(
        &mut self,
        code: &str,
        date: NaiveDate,
        shares: u64,
        price: f64,
    ) -> Result<(), CoreError> {
        self.mutate(|ledger, portfolio| {
            ledger.overwrite_position(portfolio, code, date, shares, price)
        })
    }

    /// Collapse a holding's history into a single transaction dated today,
    /// keeping its totals.
    pub fn consolidate_position(&mut self, code: &str) -> Result<(), CoreError> {
        let today = self.clock.today();
        self.mutate(|ledger, portfolio| ledger.consolidate(portfolio, code, today))
    }

    /// Two-step removal. The first call arms the guard and returns
    /// [`RemovalDecision::Armed`]; a second call for the same code inside
    /// the confirmation window removes the holding and returns
    /// [`RemovalDecision::Confirmed`].
    pub fn request_removal(&mut self, code: &str) -> Result<RemovalDecision, CoreError> {
        if !self.portfolio.contains(code) {
            return Err(CoreError::HoldingNotFound(code.to_string()));
        }
        let decision = self.removal_guard.request(code);
        if let RemovalDecision::Confirmed { code } = &decision {
            let mut working = self.portfolio.clone();
            self.ledger_service.remove(&mut working, code)?;
            self.storage.save_portfolio(&working)?;
            self.portfolio = working;
        }
        Ok(decision)
    }

    pub fn cancel_removal(&mut self) {
        self.removal_guard.cancel();
    }

    /// Code awaiting removal confirmation, if any.
    #[must_use]
    pub fn pending_removal(&self) -> Option<&str> {
        self.removal_guard.pending()
    }

    #[must_use]
    pub fn holdings(&self) -> &[HoldingLedger] {
        &self.portfolio.holdings
    }

    #[must_use]
    pub fn holding(&self, code: &str) -> Option<&HoldingLedger> {
        self.portfolio.get(code)
    }

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Full read-only snapshot, recomputed from scratch.
    #[must_use]
    pub fn snapshot(&self) -> PortfolioSnapshot {
        self.analytics_service.snapshot(&self.portfolio, &self.etfs)
    }

    #[must_use]
    pub fn holding_metrics(&self, code: &str) -> Option<HoldingMetrics> {
        let ledger = self.portfolio.get(code)?;
        Some(
            self.analytics_service
                .holding_metrics(ledger, self.find_etf(&ledger.code)),
        )
    }

    #[must_use]
    pub fn monthly_projection(&self) -> MonthlyProjection {
        self.snapshot().monthly
    }

    // ── Credential ──────────────────────────────────────────────────

    /// Store the Gemini API key. Surrounding whitespace is dropped.
    pub fn set_api_key(&mut self, key: &str) -> Result<(), CoreError> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError("API key must not be empty".into()));
        }
        let secret = SecretString::from(trimmed.to_string());
        self.storage.save_credential(&secret)?;
        self.credential = Some(secret);
        Ok(())
    }

    pub fn clear_api_key(&mut self) -> Result<(), CoreError> {
        self.storage.clear_credential()?;
        self.credential = None;
        Ok(())
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.credential.is_some()
    }

    // ── AI Advice ───────────────────────────────────────────────────

    /// Allocation proposal for `budget_wan` × 10 000 TWD. Never fails:
    /// problems come back as an advisory message.
    pub async fn smart_plan(&self, budget_wan: f64, constraints: &str) -> AdvisorOutcome {
        let key = self.credential.as_ref().map(|k| k.expose_secret());
        self.advisor_service
            .smart_plan(key, budget_wan, constraints, &self.etfs)
            .await
    }

    /// Health check of the current holdings. Never fails.
    pub async fn diagnose(&self) -> AdvisorOutcome {
        let key = self.credential.as_ref().map(|k| k.expose_secret());
        self.advisor_service.diagnose(key, &self.portfolio).await
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Apply `op` to a working copy, save it, then commit it.
    /// Any portfolio change also disarms a pending removal.
    fn mutate<F>(&mut self, op: F) -> Result<(), CoreError>
    where
        F: FnOnce(&LedgerService, &mut Portfolio) -> Result<(), CoreError>,
    {
        let mut working = self.portfolio.clone();
        op(&self.ledger_service, &mut working)?;
        self.storage.save_portfolio(&working)?;
        self.portfolio = working;
        self.removal_guard.cancel();
        Ok(())
    }
}
