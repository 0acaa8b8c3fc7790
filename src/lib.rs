pub mod cli;
pub mod core;
pub mod job;
pub mod providers;
pub mod scheduler;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::SnapshotStore;
use crate::job::{JobSettings, RateUpdateJob};
use crate::providers::MetalPriceProvider;
use crate::scheduler::Scheduler;
use crate::store::DiskStore;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Fetch and store rates once
    Run,
    /// Run on the configured daily schedule until interrupted
    Schedule,
    /// Print the stored snapshot
    Show,
    /// Print the next trigger times
    Next(usize),
}

/// Wires the configured provider and the on-disk store together.
pub struct App {
    config: AppConfig,
    store: Arc<dyn SnapshotStore>,
}

impl App {
    /// Opens the snapshot store under the configured data path.
    pub fn new(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        let store = DiskStore::open(&data_path.join("snapshots"))?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: AppConfig, store: Arc<dyn SnapshotStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> Arc<dyn SnapshotStore> {
        self.store.clone()
    }

    pub fn job(&self) -> Result<RateUpdateJob> {
        let provider = MetalPriceProvider::new(
            &self.config.provider.base_url,
            self.config.request_timeout(),
        )
        .context("Failed to build HTTP client")?;
        Ok(RateUpdateJob::new(
            Arc::new(provider),
            self.store(),
            JobSettings::from(&self.config),
        ))
    }

    pub async fn execute(&self, command: AppCommand) -> Result<()> {
        match command {
            AppCommand::Run => {
                let snapshot = self.job()?.execute().await?;
                println!(
                    "{}",
                    snapshot.display_as_table(&self.config.document_key())
                );
                Ok(())
            }
            AppCommand::Schedule => {
                let schedule = self.config.daily_schedule()?;
                let scheduler = Scheduler::new(self.job()?, schedule, self.config.run_timeout())
                    .with_run_on_start(self.config.schedule.run_on_start);
                scheduler
                    .run_until(async {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            tracing::error!(error = %e, "Failed to listen for shutdown signal");
                            std::future::pending::<()>().await;
                        }
                    })
                    .await;
                Ok(())
            }
            AppCommand::Show => cli::show::show_snapshot(&self.config, self.store.as_ref()).await,
            AppCommand::Next(count) => {
                let schedule = self.config.daily_schedule()?;
                let triggers = schedule.upcoming(Utc::now(), count);
                println!(
                    "{}",
                    cli::show::format_triggers(&triggers, schedule.offset())
                );
                Ok(())
            }
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Gold rate job starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    App::new(config)?.execute(command).await
}
