use std::path::PathBuf;

use bookxchange_core::config::{ConfigOverrides, MAX_RECOMMENDATION_LIMIT};
use bookxchange_core::domain::listing::ListingId;
use bookxchange_core::recommend::{self, Recommendation, RecommendationStrategy};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::commands::{
    invalid_argument, load_catalog, load_config, parse_optional, CommandResult,
    EXIT_INVALID_ARGS,
};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Default, Args)]
pub struct RecommendArgs {
    #[arg(long, help = "Id of the listing to find similar books for")]
    pub listing: String,
    #[arg(long, help = "Override recommendations.limit (1..=50)")]
    pub limit: Option<usize>,
    #[arg(long, help = "Override recommendations.strategy (weighted|random)")]
    pub strategy: Option<String>,
    #[arg(long, help = "Seed for the random strategy")]
    pub seed: Option<u64>,
    #[arg(long, help = "Override catalog.path")]
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RecommendData {
    reference: ListingId,
    strategy: RecommendationStrategy,
    recommendations: Vec<Recommendation>,
}

pub fn run(args: &RecommendArgs) -> CommandResult {
    let strategy = match parse_optional(COMMAND, "strategy", args.strategy.as_deref()) {
        Ok(strategy) => strategy,
        Err(result) => return result,
    };
    if let Some(limit) = args.limit {
        if !(1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) {
            return invalid_argument(
                COMMAND,
                format!("--limit: {limit} is outside 1..={MAX_RECOMMENDATION_LIMIT}"),
            );
        }
    }

    let overrides = ConfigOverrides {
        catalog_path: args.catalog.clone(),
        recommendation_strategy: strategy,
        recommendation_limit: args.limit,
        recommendation_seed: args.seed,
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

    let reference_id = ListingId(args.listing.trim().to_string());
    let Some(reference) = catalog.find(&reference_id) else {
        return CommandResult::failure(
            COMMAND,
            "listing_not_found",
            format!("no listing with id `{reference_id}` in the catalog"),
            EXIT_INVALID_ARGS,
        );
    };

    let settings = &config.recommendations;
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let recommendations =
        recommend::recommend(settings.strategy, catalog.all(), reference, settings.limit, &mut rng);
    info!(
        event_name = "cli.recommend.completed",
        reference = %reference_id,
        strategy = ?settings.strategy,
        returned = recommendations.len(),
        "recommendations computed"
    );

    let message = format!(
        "{} recommendation(s) for `{}`",
        recommendations.len(),
        reference_id
    );
    let data = RecommendData { reference: reference_id, strategy: settings.strategy, recommendations };
    CommandResult::success_with_data(COMMAND, message, &data)
}
