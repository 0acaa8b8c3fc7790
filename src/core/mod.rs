//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod provider;
pub mod rate;
pub mod schedule;
pub mod store;

// Re-export main types for cleaner imports
pub use error::RateError;
pub use provider::{MetalRateProvider, RateQuery};
pub use rate::{GoldRates, Karat, RateSnapshot, RoundingLaw};
pub use store::{DocumentKey, NewSnapshot, SnapshotStore};
