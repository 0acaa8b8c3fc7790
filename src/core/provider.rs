//! Metal pricing provider abstraction

use super::error::RateError;
use async_trait::async_trait;

/// Parameters of one latest-rate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateQuery {
    pub api_key: String,
    pub base_currency: String,
    pub symbol: String,
}

#[async_trait]
pub trait MetalRateProvider: Send + Sync {
    /// Returns the provider's quote in `symbol` units per one unit of `base_currency`.
    ///
    /// Transport and HTTP status failures are [`RateError::UpstreamUnavailable`];
    /// a body without a numeric rate is [`RateError::InvalidResponseShape`].
    /// The sign of the rate is not checked here.
    async fn latest_rate(&self, query: &RateQuery) -> Result<f64, RateError>;
}
