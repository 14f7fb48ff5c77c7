//! Price suggestions for a new listing
//!
//! Suggests a min/avg/max asking price for a genre and condition, either from
//! comparable listings already in the catalog or from a fixed per-genre model.

mod model;
mod suggester;

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub use model::{base_price, model_estimate, DEFAULT_BASE_PRICE, MODEL_SPREAD};
pub use suggester::{suggest_price, CatalogPriceSuggester, PriceSuggester};

/// Comparable listings needed before `Blended` trusts the catalog over the model
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// Range returned when nothing in the catalog matches
pub const DEFAULT_FALLBACK_RANGE: PriceRange = PriceRange {
    min: Decimal::from_parts(5, 0, 0, false, 0),
    avg: Decimal::from_parts(15, 0, 0, false, 0),
    max: Decimal::from_parts(30, 0, 0, false, 0),
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    /// Min, mean and max over listings with the same genre and condition
    Empirical,
    /// Min, mean and max over the genre, scaled by the condition multiplier
    ConditionAdjusted,
    /// Per-genre base price times the condition multiplier, +/- 20%
    Model,
    /// `Empirical` with enough samples, `Model` otherwise
    Blended,
}

impl FromStr for PricingStrategy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "empirical" => Ok(Self::Empirical),
            "condition_adjusted" => Ok(Self::ConditionAdjusted),
            "model" => Ok(Self::Model),
            "blended" => Ok(Self::Blended),
            other => Err(DomainError::InvalidArgument(format!(
                "unsupported pricing strategy `{other}` (expected empirical|condition_adjusted|model|blended)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    Static,
    Model,
}

impl FromStr for FallbackPolicy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "model" => Ok(Self::Model),
            other => Err(DomainError::InvalidArgument(format!(
                "unsupported pricing fallback `{other}` (expected static|model)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Two decimal places
    Cents,
    /// Whole currency units
    Whole,
}

impl Rounding {
    pub fn apply(&self, amount: Decimal) -> Decimal {
        let places = match self {
            Self::Cents => 2,
            Self::Whole => 0,
        };
        amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl FromStr for Rounding {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cents" => Ok(Self::Cents),
            "whole" => Ok(Self::Whole),
            other => Err(DomainError::InvalidArgument(format!(
                "unsupported rounding `{other}` (expected cents|whole)"
            ))),
        }
    }
}

/// An ordered `min <= avg <= max` triple of non-negative amounts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    min: Decimal,
    avg: Decimal,
    max: Decimal,
}

impl PriceRange {
    pub fn new(min: Decimal, avg: Decimal, max: Decimal) -> Result<Self, DomainError> {
        if min.is_sign_negative() && !min.is_zero() {
            return Err(DomainError::InvalidArgument(format!(
                "price range minimum {min} must not be negative"
            )));
        }
        if min > avg || avg > max {
            return Err(DomainError::InvalidArgument(format!(
                "price range must satisfy min <= avg <= max (got {min} / {avg} / {max})"
            )));
        }
        Ok(Self { min, avg, max })
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn avg(&self) -> Decimal {
        self.avg
    }

    pub fn max(&self) -> Decimal {
        self.max
    }
}

/// Where a suggestion's numbers came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Empirical,
    ConditionAdjusted,
    Model,
    Fallback,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empirical => "empirical",
            Self::ConditionAdjusted => "condition_adjusted",
            Self::Model => "model",
            Self::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    pub min_price: Decimal,
    pub avg_price: Decimal,
    pub max_price: Decimal,
    pub source: PriceSource,
    /// Listings the numbers were computed from; zero for model and fallback
    pub sample_size: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricingSettings {
    pub strategy: PricingStrategy,
    pub fallback: FallbackPolicy,
    pub rounding: Rounding,
    pub min_samples: usize,
    pub default_range: PriceRange,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            strategy: PricingStrategy::Empirical,
            fallback: FallbackPolicy::Static,
            rounding: Rounding::Cents,
            min_samples: DEFAULT_MIN_SAMPLES,
            default_range: DEFAULT_FALLBACK_RANGE,
        }
    }
}
