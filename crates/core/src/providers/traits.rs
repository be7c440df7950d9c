use async_trait::async_trait;

use crate::errors::{CoreError, GenerationError};
use crate::models::etf::EtfReference;

/// Source of the ETF reference dataset.
///
/// The core does not care about transport or format, only that each
/// record carries the fields of [`EtfReference`].
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ReferenceDataProvider: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch every record, in dataset order.
    async fn fetch_all(&self) -> Result<Vec<EtfReference>, CoreError>;
}

/// A generative-text backend: prompt in, one text blob out.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait TextGenerator: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Generate text for `prompt`, authenticating with `api_key`.
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError>;
}
