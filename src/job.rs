//! One rate update run: fetch, derive, overwrite

use crate::core::config::AppConfig;
use crate::core::{
    DocumentKey, GoldRates, MetalRateProvider, NewSnapshot, RateError, RateQuery, RateSnapshot,
    RoundingLaw, SnapshotStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    pub api_key: Option<String>,
    pub base_currency: String,
    pub symbol: String,
    pub document: DocumentKey,
    pub unit: String,
    pub source: String,
    pub rounding: RoundingLaw,
}

impl From<&AppConfig> for JobSettings {
    fn from(config: &AppConfig) -> Self {
        JobSettings {
            api_key: config.api_key(),
            base_currency: config.provider.base_currency.clone(),
            symbol: config.provider.symbol.clone(),
            document: config.document_key(),
            unit: config.snapshot.unit.clone(),
            source: config.snapshot.source.clone(),
            rounding: config.rounding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
}

pub struct RateUpdateJob {
    provider: Arc<dyn MetalRateProvider>,
    store: Arc<dyn SnapshotStore>,
    settings: JobSettings,
    running: AtomicBool,
}

// Returns the job to Idle even when the run future is dropped mid-flight.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RateUpdateJob {
    pub fn new(
        provider: Arc<dyn MetalRateProvider>,
        store: Arc<dyn SnapshotStore>,
        settings: JobSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings,
            running: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    pub fn state(&self) -> JobState {
        if self.running.load(Ordering::SeqCst) {
            JobState::Running
        } else {
            JobState::Idle
        }
    }

    /// Runs every step and reports the first failure. The snapshot is only
    /// written once all four rates have been derived.
    pub async fn execute(&self) -> Result<RateSnapshot, RateError> {
        self.running.store(true, Ordering::SeqCst);
        let _guard = RunningGuard(&self.running);

        let api_key = self
            .settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RateError::Configuration("provider API key is not set".to_string()))?;

        let query = RateQuery {
            api_key,
            base_currency: self.settings.base_currency.clone(),
            symbol: self.settings.symbol.clone(),
        };
        let xau_rate = self.provider.latest_rate(&query).await?;
        debug!(xau_rate, "Fetched provider quote");

        let rates = GoldRates::from_xau_rate(xau_rate, self.settings.rounding)?;
        let snapshot = NewSnapshot {
            rates,
            unit: self.settings.unit.clone(),
            source: self.settings.source.clone(),
        };

        self.store
            .replace(&self.settings.document, snapshot)
            .await
            .map_err(|e| RateError::Persistence(format!("{e:#}")))
    }

    /// Runs once and logs the outcome. Failures are swallowed; the next
    /// trigger is the retry.
    pub async fn run(&self) -> Option<RateSnapshot> {
        match self.execute().await {
            Ok(snapshot) => {
                info!(
                    document = %self.settings.document,
                    gold24k = %snapshot.rates.gold_24k,
                    gold22k = %snapshot.rates.gold_22k,
                    gold18k = %snapshot.rates.gold_18k,
                    gold14k = %snapshot.rates.gold_14k,
                    "Gold rates updated"
                );
                Some(snapshot)
            }
            Err(e) => {
                error!(
                    kind = e.kind(),
                    error = %e,
                    document = %self.settings.document,
                    "Gold rate update failed"
                );
                None
            }
        }
    }
}
