use secrecy::{ExposeSecret, SecretString};

use crate::errors::CoreError;
use crate::models::holding::Portfolio;

use super::format::{self, CREDENTIAL_KEY, PORTFOLIO_KEY};
use super::store::KeyValueStore;

/// High-level persistence: the portfolio and the API credential, each
/// under its own key in a [`KeyValueStore`].
pub struct StorageManager {
    store: Box<dyn KeyValueStore>,
}

impl StorageManager {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the saved portfolio; empty when nothing usable is stored.
    pub fn load_portfolio(&self) -> Result<Portfolio, CoreError> {
        let raw = self.store.get(PORTFOLIO_KEY)?;
        Ok(format::decode_portfolio(raw.as_deref()))
    }

    pub fn save_portfolio(&mut self, portfolio: &Portfolio) -> Result<(), CoreError> {
        let json = format::encode_portfolio(portfolio)?;
        self.store.set(PORTFOLIO_KEY, &json)
    }

    /// The stored API key, if any. Blank values count as absent.
    pub fn load_credential(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self
            .store
            .get(CREDENTIAL_KEY)?
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(SecretString::from))
    }

    pub fn save_credential(&mut self, key: &SecretString) -> Result<(), CoreError> {
        self.store.set(CREDENTIAL_KEY, key.expose_secret())
    }

    pub fn clear_credential(&mut self) -> Result<(), CoreError> {
        self.store.remove(CREDENTIAL_KEY)
    }
}
