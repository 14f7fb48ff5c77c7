//! "You may also like" recommendations
//!
//! Ranks catalog listings by similarity to a reference listing. Two named
//! strategies exist: a deterministic weighted score and a random placeholder
//! that draws from a caller-supplied generator.

mod scoring;

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::listing::{Listing, ListingId};
use crate::errors::DomainError;

pub use scoring::{random_recommendations, ScoringWeights, WeightedScorer};

/// Default weights for scoring components
pub const DEFAULT_WEIGHTS: ScoringWeights =
    ScoringWeights { genre: 0.50, price: 0.25, condition: 0.25 };

/// Default number of recommendations
pub const DEFAULT_LIMIT: usize = 3;

/// Similarity range of the random placeholder strategy
pub const RANDOM_SIMILARITY_MIN: u8 = 80;
pub const RANDOM_SIMILARITY_MAX: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStrategy {
    Weighted,
    Random,
}

impl FromStr for RecommendationStrategy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(Self::Weighted),
            "random" => Ok(Self::Random),
            other => Err(DomainError::InvalidArgument(format!(
                "unsupported recommendation strategy `{other}` (expected weighted|random)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: ListingId,
    pub title: String,
    pub genre: String,
    /// Whole-number percentage, 0-100
    pub similarity: u8,
}

impl Recommendation {
    fn from_listing(listing: &Listing, similarity: u8) -> Self {
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            genre: listing.genre.clone(),
            similarity,
        }
    }
}

/// Runs the named strategy. `rng` is only drawn from by [`RecommendationStrategy::Random`].
pub fn recommend<R: Rng>(
    strategy: RecommendationStrategy,
    catalog: &[Listing],
    reference: &Listing,
    limit: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    match strategy {
        RecommendationStrategy::Weighted => {
            WeightedScorer::default().recommend(catalog, reference, limit)
        }
        RecommendationStrategy::Random => random_recommendations(catalog, reference, limit, rng),
    }
}

/// Top three listings by weighted similarity.
pub fn recommend_similar(catalog: &[Listing], reference: &Listing) -> Vec<Recommendation> {
    WeightedScorer::default().recommend(catalog, reference, DEFAULT_LIMIT)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::listing::Condition;

    fn catalog() -> Vec<Listing> {
        vec![
            Listing::new("1", "Fiction", Condition::Good, Decimal::new(15, 0)).with_title("Ref"),
            Listing::new("2", "Fiction", Condition::Good, Decimal::new(15, 0)).with_title("Twin"),
            Listing::new("3", "Mystery", Condition::New, Decimal::new(40, 0)).with_title("Far"),
            Listing::new("4", "Fiction", Condition::New, Decimal::new(30, 0)).with_title("Near"),
        ]
    }

    #[test]
    fn strategy_names_parse() {
        assert_eq!("Weighted".parse::<RecommendationStrategy>(), Ok(RecommendationStrategy::Weighted));
        assert_eq!("random".parse::<RecommendationStrategy>(), Ok(RecommendationStrategy::Random));
        assert!("cosine".parse::<RecommendationStrategy>().is_err());
    }

    #[test]
    fn dispatch_runs_named_strategy() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);

        let weighted =
            recommend(RecommendationStrategy::Weighted, &catalog, &catalog[0], 3, &mut rng);
        assert_eq!(weighted, recommend_similar(&catalog, &catalog[0]));

        let random = recommend(RecommendationStrategy::Random, &catalog, &catalog[0], 3, &mut rng);
        assert_eq!(random.len(), 2);
        assert!(random.iter().all(|rec| rec.genre == "Fiction"));
    }
}
