pub mod assistant;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod recommend;

pub use assistant::{recognize_intent, Assistant, AssistantReply, Intent};
pub use catalog::{Catalog, CatalogError, CatalogLoadReport, CatalogQuery, SkippedRecord, SortOrder};
pub use domain::exchange::{ExchangeId, ExchangeLedger, ExchangeRequest, ExchangeStatus};
pub use domain::listing::{Condition, Listing, ListingId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::{
    suggest_price, CatalogPriceSuggester, FallbackPolicy, PriceRange, PriceSource,
    PriceSuggester, PriceSuggestion, PricingSettings, PricingStrategy, Rounding,
};
pub use recommend::{
    recommend, recommend_similar, Recommendation, RecommendationStrategy, ScoringWeights,
    WeightedScorer,
};
