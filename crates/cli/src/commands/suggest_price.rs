use std::path::PathBuf;

use bookxchange_core::config::ConfigOverrides;
use bookxchange_core::domain::listing::Condition;
use bookxchange_core::pricing::{
    CatalogPriceSuggester, PriceSuggester, PriceSuggestion, PricingStrategy,
};
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::commands::{load_catalog, load_config, parse_arg, parse_optional, CommandResult};

const COMMAND: &str = "suggest-price";

#[derive(Debug, Clone, Default, Args)]
pub struct SuggestPriceArgs {
    #[arg(long, help = "Genre of the book being listed")]
    pub genre: String,
    #[arg(long, help = "Condition label, e.g. \"Like New\" or like-new")]
    pub condition: String,
    #[arg(long, help = "Override pricing.strategy (empirical|condition_adjusted|model|blended)")]
    pub strategy: Option<String>,
    #[arg(long, help = "Override catalog.path")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SuggestPriceData<'a> {
    genre: &'a str,
    condition: Condition,
    strategy: PricingStrategy,
    #[serde(flatten)]
    suggestion: PriceSuggestion,
}

pub fn run(args: &SuggestPriceArgs) -> CommandResult {
    let condition: Condition = match parse_arg(COMMAND, "condition", &args.condition) {
        Ok(condition) => condition,
        Err(result) => return result,
    };
    let strategy = match parse_optional(COMMAND, "strategy", args.strategy.as_deref()) {
        Ok(strategy) => strategy,
        Err(result) => return result,
    };

    let overrides = ConfigOverrides {
        catalog_path: args.catalog.clone(),
        pricing_strategy: strategy,
        ..ConfigOverrides::default()
    };
    let config = match load_config(COMMAND, overrides) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let catalog = match load_catalog(COMMAND, &config) {
        Ok(catalog) => catalog,
        Err(result) => return result,
    };

    let suggester = CatalogPriceSuggester::new(config.pricing.clone());
    let suggestion = suggester.suggest(catalog.all(), &args.genre, condition);
    info!(
        event_name = "cli.suggest_price.completed",
        genre = %args.genre,
        condition = %condition,
        source = %suggestion.source,
        sample_size = suggestion.sample_size,
        "price suggestion computed"
    );

    let message = format!(
        "{} {}: {} - {} (avg {}, source {})",
        args.genre.trim(),
        condition,
        suggestion.min_price,
        suggestion.max_price,
        suggestion.avg_price,
        suggestion.source
    );
    let data = SuggestPriceData {
        genre: args.genre.trim(),
        condition,
        strategy: config.pricing.strategy,
        suggestion,
    };
    CommandResult::success_with_data(COMMAND, message, &data)
}
