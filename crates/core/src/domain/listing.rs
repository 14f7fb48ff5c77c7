use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quality grade of a listed book, best first.
///
/// Labels from the older five-step scale (`new`, `like-new`, `good`, `fair`,
/// `poor`) still parse: `fair` and `poor` both land on [`Condition::Acceptable`],
/// so a `fair` copy is priced at 0.3 of new rather than the old scale's 0.5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Condition {
    New,
    LikeNew,
    VeryGood,
    Good,
    Acceptable,
}

impl Condition {
    pub const ALL: [Condition; 5] =
        [Self::New, Self::LikeNew, Self::VeryGood, Self::Good, Self::Acceptable];

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like New",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Acceptable => "Acceptable",
        }
    }

    /// Share of a new copy's price that a copy in this condition fetches.
    pub fn price_multiplier(&self) -> Decimal {
        match self {
            Self::New => Decimal::ONE,
            Self::LikeNew => Decimal::new(9, 1),
            Self::VeryGood => Decimal::new(8, 1),
            Self::Good => Decimal::new(7, 1),
            Self::Acceptable => Decimal::new(3, 1),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "new" => Ok(Self::New),
            "likenew" => Ok(Self::LikeNew),
            "verygood" => Ok(Self::VeryGood),
            "good" => Ok(Self::Good),
            "acceptable" | "fair" | "poor" => Ok(Self::Acceptable),
            _ => Err(DomainError::InvalidArgument(format!(
                "unknown condition `{}` (expected New|Like New|Very Good|Good|Acceptable)",
                value.trim()
            ))),
        }
    }
}

impl TryFrom<String> for Condition {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Condition> for &'static str {
    fn from(value: Condition) -> Self {
        value.label()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub genre: String,
    pub condition: Condition,
    pub price: Decimal,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn new(
        id: impl Into<String>,
        genre: impl Into<String>,
        condition: Condition,
        price: Decimal,
    ) -> Self {
        Self {
            id: ListingId(id.into()),
            title: String::new(),
            author: String::new(),
            genre: genre.into(),
            condition,
            price,
            owner_id: String::new(),
            description: String::new(),
            created_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    pub fn in_genre(&self, genre: &str) -> bool {
        genre_matches(&self.genre, genre)
    }
}

/// Case-insensitive exact comparison of two genre labels.
pub fn genre_matches(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{genre_matches, Condition, Listing};
    use crate::errors::DomainError;

    #[test]
    fn parses_canonical_and_legacy_condition_labels() {
        assert_eq!("Like New".parse::<Condition>(), Ok(Condition::LikeNew));
        assert_eq!("like-new".parse::<Condition>(), Ok(Condition::LikeNew));
        assert_eq!("very_good".parse::<Condition>(), Ok(Condition::VeryGood));
        assert_eq!(" GOOD ".parse::<Condition>(), Ok(Condition::Good));
        assert_eq!("fair".parse::<Condition>(), Ok(Condition::Acceptable));
        assert_eq!("poor".parse::<Condition>(), Ok(Condition::Acceptable));
    }

    #[test]
    fn fair_and_poor_share_the_acceptable_multiplier() {
        for label in ["fair", "poor", "Acceptable"] {
            let condition: Condition = label.parse().expect("legacy label parses");
            assert_eq!(condition.price_multiplier(), Decimal::new(3, 1), "{label}");
        }
        assert!(Condition::Good.price_multiplier() > Condition::Acceptable.price_multiplier());
    }

    #[test]
    fn unknown_condition_is_invalid_argument() {
        let error = "mint".parse::<Condition>().expect_err("mint is not a grade");
        assert!(matches!(error, DomainError::InvalidArgument(ref message) if message.contains("mint")));
    }

    #[test]
    fn conditions_order_best_first() {
        assert!(Condition::New < Condition::LikeNew);
        assert!(Condition::Good < Condition::Acceptable);
        let multipliers: Vec<Decimal> =
            Condition::ALL.iter().map(Condition::price_multiplier).collect();
        assert!(multipliers.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn condition_serializes_as_display_label() {
        let json = serde_json::to_string(&Condition::VeryGood).expect("serialize");
        assert_eq!(json, "\"Very Good\"");
        let parsed: Condition = serde_json::from_str("\"like-new\"").expect("deserialize");
        assert_eq!(parsed, Condition::LikeNew);
    }

    #[test]
    fn genre_comparison_ignores_case_and_padding() {
        assert!(genre_matches("Science Fiction", " science fiction"));
        assert!(!genre_matches("Fiction", "Non-Fiction"));

        let listing = Listing::new("b-1", "Mystery", Condition::Good, Decimal::new(800, 2));
        assert!(listing.in_genre("MYSTERY"));
    }
}
