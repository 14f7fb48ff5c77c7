use std::path::PathBuf;

use bookxchange_core::catalog::{CatalogQuery, SortOrder};
use bookxchange_core::config::ConfigOverrides;
use bookxchange_core::domain::listing::{Condition, Listing};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{
    invalid_argument, load_catalog, load_config, parse_arg, parse_optional, CommandResult,
};

const COMMAND: &str = "browse";

#[derive(Debug, Clone, Default, Args)]
pub struct BrowseArgs {
    #[arg(long, help = "Case-insensitive match on title or author")]
    pub search: Option<String>,
    #[arg(long = "genre", help = "Keep listings in this genre; repeatable")]
    pub genres: Vec<String>,
    #[arg(long = "condition", help = "Keep listings in this condition; repeatable")]
    pub conditions: Vec<String>,
    #[arg(long)]
    pub min_price: Option<String>,
    #[arg(long)]
    pub max_price: Option<String>,
    #[arg(long, help = "relevance|price-low|price-high|title")]
    pub sort: Option<String>,
    #[arg(long, help = "Override catalog.path")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BrowseData<'a> {
    total: usize,
    listings: Vec<&'a Listing>,
}

pub fn run(args: &BrowseArgs) -> CommandResult {
    let query = match build_query(args) {
        Ok(query) => query,
        Err(result) => return result,
    };

    let overrides =
        ConfigOverrides { catalog_path: args.catalog.clone(), ..ConfigOverrides::default() };
    let config = match load_config(COMMAND, overrides) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let catalog = match load_catalog(COMMAND, &config) {
        Ok(catalog) => catalog,
        Err(result) => return result,
    };

    let listings = catalog.browse(&query);
    let message = format!("{} of {} listing(s) match", listings.len(), catalog.len());
    CommandResult::success_with_data(
        COMMAND,
        message,
        &BrowseData { total: catalog.len(), listings },
    )
}

fn build_query(args: &BrowseArgs) -> Result<CatalogQuery, CommandResult> {
    let conditions = args
        .conditions
        .iter()
        .map(|raw| parse_arg::<Condition>(COMMAND, "condition", raw))
        .collect::<Result<Vec<_>, _>>()?;
    let sort: Option<SortOrder> = parse_optional(COMMAND, "sort", args.sort.as_deref())?;
    let min_price = parse_price("min-price", args.min_price.as_deref())?;
    let max_price = parse_price("max-price", args.max_price.as_deref())?;

    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(invalid_argument(
                COMMAND,
                format!("--min-price {min} is greater than --max-price {max}"),
            ));
        }
    }

    Ok(CatalogQuery {
        search: args.search.clone(),
        min_price,
        max_price,
        conditions,
        genres: args.genres.clone(),
        sort: sort.unwrap_or_default(),
    })
}

fn parse_price(name: &str, raw: Option<&str>) -> Result<Option<Decimal>, CommandResult> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<Decimal>() {
        Ok(price) if !price.is_sign_negative() || price.is_zero() => Ok(Some(price)),
        Ok(price) => {
            Err(invalid_argument(COMMAND, format!("--{name}: price {price} must not be negative")))
        }
        Err(error) => Err(invalid_argument(COMMAND, format!("--{name}: {error}"))),
    }
}
