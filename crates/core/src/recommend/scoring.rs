//! Similarity scoring between listings

use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::{Recommendation, RANDOM_SIMILARITY_MAX, RANDOM_SIMILARITY_MIN};
use crate::domain::listing::{genre_matches, Listing};

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Awarded in full on a genre match (default: 0.50)
    pub genre: f64,
    /// Scaled by price closeness (default: 0.25)
    pub price: f64,
    /// Awarded in full on a condition match (default: 0.25)
    pub condition: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    weights: ScoringWeights,
}

impl WeightedScorer {
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Similarity of `candidate` to `reference` in 0.0..=1.0
    pub fn score(&self, reference: &Listing, candidate: &Listing) -> f64 {
        let genre = if genre_matches(&reference.genre, &candidate.genre) { 1.0 } else { 0.0 };
        let condition = if reference.condition == candidate.condition { 1.0 } else { 0.0 };
        let price = price_closeness(reference.price, candidate.price);

        let total = genre * self.weights.genre
            + price * self.weights.price
            + condition * self.weights.condition;

        total.clamp(0.0, 1.0)
    }

    /// Ranks every other listing by score; ties keep catalog order.
    pub fn recommend(
        &self,
        catalog: &[Listing],
        reference: &Listing,
        limit: usize,
    ) -> Vec<Recommendation> {
        let mut ranked: Vec<Recommendation> = catalog
            .iter()
            .filter(|candidate| candidate.id != reference.id)
            .map(|candidate| {
                let similarity = to_percentage(self.score(reference, candidate));
                Recommendation::from_listing(candidate, similarity)
            })
            .collect();

        ranked.sort_by(|a, b| b.similarity.cmp(&a.similarity));
        ranked.truncate(limit);
        ranked
    }
}

/// Same-genre listings with a display-only similarity drawn from `rng`.
pub fn random_recommendations<R: Rng>(
    catalog: &[Listing],
    reference: &Listing,
    limit: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = catalog
        .iter()
        .filter(|candidate| candidate.id != reference.id)
        .filter(|candidate| genre_matches(&candidate.genre, &reference.genre))
        .map(|candidate| {
            let similarity = rng.random_range(RANDOM_SIMILARITY_MIN..=RANDOM_SIMILARITY_MAX);
            Recommendation::from_listing(candidate, similarity)
        })
        .collect();

    ranked.sort_by(|a, b| b.similarity.cmp(&a.similarity));
    ranked.truncate(limit);
    ranked
}

/// 1.0 at equal prices, decaying linearly to 0.0 once the gap reaches 100% of
/// the reference price.
fn price_closeness(reference: Decimal, candidate: Decimal) -> f64 {
    if reference.is_zero() {
        return if candidate.is_zero() { 1.0 } else { 0.0 };
    }

    let relative_gap = candidate
        .checked_sub(reference)
        .and_then(|gap| gap.abs().checked_div(reference.abs()))
        .and_then(|ratio| ratio.to_f64())
        .unwrap_or(1.0);
    1.0 - relative_gap.min(1.0)
}

fn to_percentage(score: f64) -> u8 {
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}
