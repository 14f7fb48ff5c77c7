use rust_decimal::Decimal;

use crate::domain::listing::{genre_matches, Condition};

/// Base price for a genre missing from the table
pub const DEFAULT_BASE_PRICE: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Half-width of the model's price band (20%)
pub const MODEL_SPREAD: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

// Typical asking price of a new copy, whole currency units.
const GENRE_BASE_PRICES: &[(&str, i64)] = &[
    ("Fiction", 12),
    ("Non-Fiction", 15),
    ("Mystery", 10),
    ("Fantasy", 13),
    ("Romance", 8),
    ("Science Fiction", 12),
    ("Biography", 14),
    ("History", 16),
    ("Self-Help", 12),
    ("Business", 18),
    ("Technology", 25),
    ("Health", 14),
    ("Travel", 15),
    ("Cooking", 20),
    ("Art", 22),
    ("Music", 16),
    ("Sports", 12),
    ("Children's", 7),
    ("Young Adult", 10),
];

pub fn base_price(genre: &str) -> Decimal {
    GENRE_BASE_PRICES
        .iter()
        .find(|(name, _)| genre_matches(name, genre))
        .map(|(_, price)| Decimal::from(*price))
        .unwrap_or(DEFAULT_BASE_PRICE)
}

/// Point estimate for a copy of `genre` in `condition`, before rounding.
pub fn model_estimate(genre: &str, condition: Condition) -> Decimal {
    base_price(genre) * condition.price_multiplier()
}
