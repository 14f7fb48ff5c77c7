use rust_decimal::Decimal;
use tracing::debug;

use super::model::{model_estimate, MODEL_SPREAD};
use super::{
    FallbackPolicy, PriceRange, PriceSource, PriceSuggestion, PricingSettings, PricingStrategy,
};
use crate::domain::listing::{Condition, Listing};

pub trait PriceSuggester: Send + Sync {
    fn suggest(&self, catalog: &[Listing], genre: &str, condition: Condition) -> PriceSuggestion;
}

/// Suggester driven by [`PricingSettings`]; stateless between calls.
#[derive(Clone, Debug, Default)]
pub struct CatalogPriceSuggester {
    settings: PricingSettings,
}

impl CatalogPriceSuggester {
    pub fn new(settings: PricingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    fn empirical(&self, prices: &[Decimal]) -> Option<PriceRange> {
        let min = prices.iter().copied().min()?;
        let max = prices.iter().copied().max()?;
        // Sums beyond Decimal::MAX have no mean; callers take their fallback path.
        let total = prices.iter().try_fold(Decimal::ZERO, |acc, price| acc.checked_add(*price))?;
        let avg = total.checked_div(Decimal::from(prices.len()))?;
        PriceRange::new(min, avg, max).ok()
    }

    fn model(&self, genre: &str, condition: Condition) -> PriceSuggestion {
        let estimate = model_estimate(genre, condition);
        self.finish(
            estimate * (Decimal::ONE - MODEL_SPREAD),
            estimate,
            estimate * (Decimal::ONE + MODEL_SPREAD),
            PriceSource::Model,
            0,
        )
    }

    fn fallback(&self, genre: &str, condition: Condition) -> PriceSuggestion {
        debug!(
            event_name = "pricing.fallback",
            genre,
            condition = %condition,
            policy = ?self.settings.fallback,
            "no comparable listings, using fallback"
        );
        match self.settings.fallback {
            FallbackPolicy::Static => {
                let range = self.settings.default_range;
                self.finish(range.min(), range.avg(), range.max(), PriceSource::Fallback, 0)
            }
            FallbackPolicy::Model => self.model(genre, condition),
        }
    }

    fn finish(
        &self,
        min: Decimal,
        avg: Decimal,
        max: Decimal,
        source: PriceSource,
        sample_size: usize,
    ) -> PriceSuggestion {
        let rounding = self.settings.rounding;
        PriceSuggestion {
            min_price: rounding.apply(min),
            avg_price: rounding.apply(avg),
            max_price: rounding.apply(max),
            source,
            sample_size,
        }
    }
}

impl PriceSuggester for CatalogPriceSuggester {
    fn suggest(&self, catalog: &[Listing], genre: &str, condition: Condition) -> PriceSuggestion {
        let (in_genre, negative): (Vec<&Listing>, Vec<&Listing>) = catalog
            .iter()
            .filter(|listing| listing.in_genre(genre))
            .partition(|listing| !listing.price.is_sign_negative() || listing.price.is_zero());
        if !negative.is_empty() {
            debug!(
                event_name = "pricing.negative_price_ignored",
                genre,
                ignored = negative.len(),
                "ignoring listings with a negative price"
            );
        }
        let same_condition: Vec<Decimal> = in_genre
            .iter()
            .filter(|listing| listing.condition == condition)
            .map(|listing| listing.price)
            .collect();

        match self.settings.strategy {
            PricingStrategy::Empirical => match self.empirical(&same_condition) {
                Some(range) => self.finish(
                    range.min(),
                    range.avg(),
                    range.max(),
                    PriceSource::Empirical,
                    same_condition.len(),
                ),
                None => self.fallback(genre, condition),
            },
            PricingStrategy::ConditionAdjusted => {
                let prices: Vec<Decimal> = in_genre.iter().map(|listing| listing.price).collect();
                match self.empirical(&prices) {
                    Some(range) => {
                        let multiplier = condition.price_multiplier();
                        self.finish(
                            range.min() * multiplier,
                            range.avg() * multiplier,
                            range.max() * multiplier,
                            PriceSource::ConditionAdjusted,
                            prices.len(),
                        )
                    }
                    None => self.fallback(genre, condition),
                }
            }
            PricingStrategy::Model => self.model(genre, condition),
            PricingStrategy::Blended => {
                let enough = same_condition.len() >= self.settings.min_samples.max(1);
                match self.empirical(&same_condition).filter(|_| enough) {
                    Some(range) => self.finish(
                        range.min(),
                        range.avg(),
                        range.max(),
                        PriceSource::Empirical,
                        same_condition.len(),
                    ),
                    None => self.model(genre, condition),
                }
            }
        }
    }
}

/// Empirical suggestion with the static fallback, rounded to cents.
pub fn suggest_price(catalog: &[Listing], genre: &str, condition: Condition) -> PriceSuggestion {
    CatalogPriceSuggester::default().suggest(catalog, genre, condition)
}
