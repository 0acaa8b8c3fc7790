//! Gold rate derivation and the persisted snapshot type

use super::error::RateError;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Troy ounce in grams, truncated to four places.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

const DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Karat {
    K24,
    K22,
    K18,
    K14,
}

impl Karat {
    pub const ALL: [Karat; 4] = [Karat::K24, Karat::K22, Karat::K18, Karat::K14];

    /// Fineness relative to pure gold.
    pub fn purity(&self) -> f64 {
        match self {
            Karat::K24 => 1.0,
            Karat::K22 => 0.916,
            Karat::K18 => 0.75,
            Karat::K14 => 0.585,
        }
    }
}

impl Display for Karat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Karat::K24 => "24k",
                Karat::K22 => "22k",
                Karat::K18 => "18k",
                Karat::K14 => "14k",
            }
        )
    }
}

/// How a derived rate is rounded to two decimal places.
///
/// The two laws only disagree on exact midpoints: `2.345` is `2.35` when
/// rounding half away from zero and `2.34` under half-even.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingLaw {
    #[default]
    HalfAwayFromZero,
    HalfEven,
}

impl RoundingLaw {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingLaw::HalfAwayFromZero => RoundingStrategy::MidpointAwayFromZero,
            RoundingLaw::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    pub fn round(self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(DECIMAL_PLACES, self.strategy())
    }
}

/// Per-gram prices in the provider's base currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldRates {
    #[serde(rename = "gold24k", with = "rust_decimal::serde::float")]
    pub gold_24k: Decimal,
    #[serde(rename = "gold22k", with = "rust_decimal::serde::float")]
    pub gold_22k: Decimal,
    #[serde(rename = "gold18k", with = "rust_decimal::serde::float")]
    pub gold_18k: Decimal,
    #[serde(rename = "gold14k", with = "rust_decimal::serde::float")]
    pub gold_14k: Decimal,
}

impl GoldRates {
    /// Derives the four karat rates from a quote expressed as troy ounces of
    /// gold per one unit of currency.
    ///
    /// Lower purities are scaled from the unrounded 24k value; rounding is
    /// applied to each rate last.
    pub fn from_xau_rate(xau_rate: f64, rounding: RoundingLaw) -> Result<Self, RateError> {
        if !xau_rate.is_finite() || xau_rate <= 0.0 {
            return Err(RateError::InvalidRate(format!(
                "expected a positive quote, got {xau_rate}"
            )));
        }

        let per_ounce = 1.0 / xau_rate;
        let per_gram = per_ounce / GRAMS_PER_TROY_OUNCE;
        if !per_gram.is_finite() {
            return Err(RateError::InvalidRate(format!(
                "quote {xau_rate} does not invert to a finite price"
            )));
        }

        let derive = |karat: Karat| -> Result<Decimal, RateError> {
            let raw = per_gram * karat.purity();
            Decimal::from_f64(raw)
                .map(|value| rounding.round(value))
                .ok_or_else(|| {
                    RateError::InvalidRate(format!("{karat} price {raw} is out of range"))
                })
        };

        Ok(GoldRates {
            gold_24k: derive(Karat::K24)?,
            gold_22k: derive(Karat::K22)?,
            gold_18k: derive(Karat::K18)?,
            gold_14k: derive(Karat::K14)?,
        })
    }

    pub fn get(&self, karat: Karat) -> Decimal {
        match karat {
            Karat::K24 => self.gold_24k,
            Karat::K22 => self.gold_22k,
            Karat::K18 => self.gold_18k,
            Karat::K14 => self.gold_14k,
        }
    }
}

/// The single current rate document for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    #[serde(flatten)]
    pub rates: GoldRates,
    pub unit: String,
    pub source: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
