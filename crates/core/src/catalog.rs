//! Immutable catalog snapshot handed to the heuristics.
//!
//! Listings arrive as a JSON export from the marketplace backend. Loading is
//! lenient: a malformed record is skipped and reported instead of failing the
//! whole snapshot.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::listing::{genre_matches, Condition, Listing, ListingId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogLoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    listings: Vec<Listing>,
}

impl Catalog {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn load(path: &Path) -> Result<(Self, CatalogLoadReport), CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        let (catalog, report) = Self::from_json_str(&raw)?;
        debug!(
            event_name = "catalog.load.file",
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "catalog file loaded"
        );
        Ok((catalog, report))
    }

    pub fn from_json_str(raw: &str) -> Result<(Self, CatalogLoadReport), CatalogError> {
        let records: Vec<ListingRecord> = serde_json::from_str(raw)?;
        let mut report = CatalogLoadReport::default();
        let mut seen = HashSet::new();
        let mut listings = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            match record.into_listing() {
                Ok(listing) if !seen.insert(listing.id.clone()) => {
                    report.skipped.push(SkippedRecord {
                        index,
                        reason: format!("duplicate listing id `{}`", listing.id),
                    });
                }
                Ok(listing) => listings.push(listing),
                Err(reason) => report.skipped.push(SkippedRecord { index, reason }),
            }
        }

        for skipped in &report.skipped {
            warn!(
                event_name = "catalog.load.record_skipped",
                index = skipped.index,
                reason = %skipped.reason,
                "skipping catalog record"
            );
        }

        report.loaded = listings.len();
        Ok((Self { listings }, report))
    }

    pub fn all(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn find(&self, listing_id: &ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| &listing.id == listing_id)
    }

    pub fn by_owner(&self, owner_id: &str) -> Vec<&Listing> {
        self.listings.iter().filter(|listing| listing.owner_id == owner_id).collect()
    }

    /// Applies the browse page filters, then its sort order.
    pub fn browse(&self, query: &CatalogQuery) -> Vec<&Listing> {
        let mut matches: Vec<&Listing> =
            self.listings.iter().filter(|listing| query.matches(listing)).collect();

        match query.sort {
            SortOrder::Relevance => {}
            SortOrder::PriceLow => matches.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHigh => matches.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Title => {
                matches.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            }
        }

        matches
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Title,
}

impl std::str::FromStr for SortOrder {
    type Err = crate::errors::DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "relevance" => Ok(Self::Relevance),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "title" => Ok(Self::Title),
            other => Err(crate::errors::DomainError::InvalidArgument(format!(
                "unsupported sort order `{other}` (expected relevance|price-low|price-high|title)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub conditions: Vec<Condition>,
    pub genres: Vec<String>,
    pub sort: SortOrder,
}

impl CatalogQuery {
    fn matches(&self, listing: &Listing) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                listing.title.to_lowercase().contains(&term)
                    || listing.author.to_lowercase().contains(&term)
            }
            _ => true,
        };
        let matches_price = self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max);
        let matches_condition =
            self.conditions.is_empty() || self.conditions.contains(&listing.condition);
        let matches_genre = self.genres.is_empty()
            || self.genres.iter().any(|genre| genre_matches(&listing.genre, genre));

        matches_search && matches_price && matches_condition && matches_genre
    }
}

#[derive(Debug, Deserialize)]
struct ListingRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    genre: String,
    #[serde(default)]
    condition: String,
    price: Option<Decimal>,
    #[serde(default, alias = "userId", alias = "user_id")]
    owner_id: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "createdAt")]
    created_at: Option<DateTime<Utc>>,
}

impl ListingRecord {
    fn into_listing(self) -> Result<Listing, String> {
        let id = self.id.trim().to_owned();
        if id.is_empty() {
            return Err("missing listing id".to_owned());
        }
        if self.genre.trim().is_empty() {
            return Err(format!("listing `{id}` has no genre"));
        }
        let condition: Condition =
            self.condition.parse().map_err(|error| format!("listing `{id}`: {error}"))?;
        let price = self.price.ok_or_else(|| format!("listing `{id}` has no price"))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(format!("listing `{id}` has negative price {price}"));
        }

        Ok(Listing {
            id: ListingId(id),
            title: self.title,
            author: self.author,
            genre: self.genre,
            condition,
            price,
            owner_id: self.owner_id,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{Catalog, CatalogError, CatalogQuery, SortOrder};
    use crate::domain::listing::{Condition, ListingId};

    const EXPORT: &str = r#"[
        {"id": "b-1", "title": "Dune", "author": "Frank Herbert", "genre": "Science Fiction",
         "condition": "Very Good", "price": 14.5, "userId": "u-1"},
        {"id": "b-2", "title": "Gone Girl", "author": "Gillian Flynn", "genre": "Mystery",
         "condition": "like-new", "price": "9.99", "owner_id": "u-2",
         "createdAt": "2024-03-01T10:00:00Z"},
        {"id": "b-3", "title": "Atomic Habits", "author": "James Clear", "genre": "Self-Help",
         "condition": "Good", "price": 0, "owner_id": "u-1"},
        {"id": "b-4", "title": "Broken", "genre": "Fiction", "condition": "mint", "price": 3},
        {"id": "b-5", "title": "Refund", "genre": "Fiction", "condition": "Good", "price": -2},
        {"id": "b-1", "title": "Dune (dup)", "genre": "Science Fiction", "condition": "New", "price": 20},
        {"title": "No id", "genre": "Fiction", "condition": "New", "price": 4}
    ]"#;

    fn catalog() -> Catalog {
        Catalog::from_json_str(EXPORT).expect("export parses").0
    }

    #[test]
    fn lenient_load_skips_bad_records_and_reports_them() {
        let (catalog, report) = Catalog::from_json_str(EXPORT).expect("export parses");

        assert_eq!(catalog.len(), 3);
        assert_eq!(report.loaded, 3);
        let skipped: Vec<usize> = report.skipped.iter().map(|record| record.index).collect();
        assert_eq!(skipped, vec![3, 4, 5, 6]);
        assert!(report.skipped[0].reason.contains("mint"));
        assert!(report.skipped[2].reason.contains("duplicate"));

        let first = catalog.find(&ListingId("b-1".to_owned())).expect("first b-1 kept");
        assert_eq!(first.title, "Dune");
        assert_eq!(first.owner_id, "u-1");
        assert_eq!(first.price, Decimal::new(145, 1));
        assert!(catalog.find(&ListingId("b-2".to_owned())).and_then(|l| l.created_at).is_some());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let error = Catalog::from_json_str("{not json").expect_err("should fail");
        assert!(matches!(error, CatalogError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, EXPORT).expect("write export");

        let (catalog, _) = Catalog::load(&path).expect("load from file");
        assert_eq!(catalog.len(), 3);

        let error = Catalog::load(&dir.path().join("absent.json")).expect_err("missing file");
        assert!(matches!(error, CatalogError::ReadFile { .. }));
    }

    #[test]
    fn by_owner_returns_only_that_owners_listings() {
        let catalog = catalog();
        let ids: Vec<&str> =
            catalog.by_owner("u-1").iter().map(|listing| listing.id.0.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-3"]);
        assert!(catalog.by_owner("nobody").is_empty());
    }

    #[test]
    fn browse_combines_filters() {
        let catalog = catalog();

        let by_author = catalog
            .browse(&CatalogQuery { search: Some("CLEAR".to_owned()), ..CatalogQuery::default() });
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].title, "Atomic Habits");

        let priced = catalog.browse(&CatalogQuery {
            min_price: Some(Decimal::ONE),
            max_price: Some(Decimal::new(10, 0)),
            ..CatalogQuery::default()
        });
        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].id.0, "b-2");

        let graded = catalog.browse(&CatalogQuery {
            conditions: vec![Condition::VeryGood, Condition::Good],
            genres: vec!["science fiction".to_owned()],
            ..CatalogQuery::default()
        });
        assert_eq!(graded.len(), 1);
        assert_eq!(graded[0].id.0, "b-1");
    }

    #[test]
    fn browse_sorts_by_requested_order() {
        let catalog = catalog();
        let ids = |sort: SortOrder| -> Vec<String> {
            catalog
                .browse(&CatalogQuery { sort, ..CatalogQuery::default() })
                .iter()
                .map(|listing| listing.id.0.clone())
                .collect()
        };

        assert_eq!(ids(SortOrder::Relevance), vec!["b-1", "b-2", "b-3"]);
        assert_eq!(ids(SortOrder::PriceLow), vec!["b-3", "b-2", "b-1"]);
        assert_eq!(ids(SortOrder::PriceHigh), vec!["b-1", "b-2", "b-3"]);
        assert_eq!(ids(SortOrder::Title), vec!["b-3", "b-1", "b-2"]);
        assert_eq!("price_low".parse::<SortOrder>(), Ok(SortOrder::PriceLow));
    }
}
