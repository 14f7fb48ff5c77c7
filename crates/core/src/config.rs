use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{
    FallbackPolicy, PriceRange, PricingSettings, PricingStrategy, Rounding,
};
use crate::recommend::{RecommendationStrategy, DEFAULT_LIMIT};

pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub pricing: PricingSettings,
    pub recommendations: RecommendationConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct RecommendationConfig {
    pub strategy: RecommendationStrategy,
    pub limit: usize,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub pricing_strategy: Option<PricingStrategy>,
    pub recommendation_strategy: Option<RecommendationStrategy>,
    pub recommendation_limit: Option<usize>,
    pub recommendation_seed: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig { path: PathBuf::from("catalog.json") },
            pricing: PricingSettings::default(),
            recommendations: RecommendationConfig {
                strategy: RecommendationStrategy::Weighted,
                limit: DEFAULT_LIMIT,
                seed: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bookx.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = path;
            }
        }

        if let Some(pricing) = patch.pricing {
            if let Some(strategy) = pricing.strategy {
                self.pricing.strategy = strategy;
            }
            if let Some(fallback) = pricing.fallback {
                self.pricing.fallback = fallback;
            }
            if let Some(rounding) = pricing.rounding {
                self.pricing.rounding = rounding;
            }
            if let Some(min_samples) = pricing.min_samples {
                self.pricing.min_samples = min_samples;
            }

            let has_range = pricing.default_min.is_some()
                || pricing.default_avg.is_some()
                || pricing.default_max.is_some();
            if has_range {
                let current = self.pricing.default_range;
                self.pricing.default_range = PriceRange::new(
                    pricing.default_min.unwrap_or(current.min()),
                    pricing.default_avg.unwrap_or(current.avg()),
                    pricing.default_max.unwrap_or(current.max()),
                )
                .map_err(|error| {
                    ConfigError::Validation(format!("pricing default range: {error}"))
                })?;
            }
        }

        if let Some(recommendations) = patch.recommendations {
            if let Some(strategy) = recommendations.strategy {
                self.recommendations.strategy = strategy;
            }
            if let Some(limit) = recommendations.limit {
                self.recommendations.limit = limit;
            }
            if let Some(seed) = recommendations.seed {
                self.recommendations.seed = Some(seed);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BOOKX_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("BOOKX_PRICING_STRATEGY") {
            self.pricing.strategy = parse_named("BOOKX_PRICING_STRATEGY", &value)?;
        }
        if let Some(value) = read_env("BOOKX_PRICING_FALLBACK") {
            self.pricing.fallback = parse_named("BOOKX_PRICING_FALLBACK", &value)?;
        }
        if let Some(value) = read_env("BOOKX_PRICING_ROUNDING") {
            self.pricing.rounding = parse_named("BOOKX_PRICING_ROUNDING", &value)?;
        }
        if let Some(value) = read_env("BOOKX_PRICING_MIN_SAMPLES") {
            self.pricing.min_samples = parse_named("BOOKX_PRICING_MIN_SAMPLES", &value)?;
        }

        if let Some(value) = read_env("BOOKX_RECOMMENDATIONS_STRATEGY") {
            self.recommendations.strategy =
                parse_named("BOOKX_RECOMMENDATIONS_STRATEGY", &value)?;
        }
        if let Some(value) = read_env("BOOKX_RECOMMENDATIONS_LIMIT") {
            self.recommendations.limit = parse_named("BOOKX_RECOMMENDATIONS_LIMIT", &value)?;
        }
        if let Some(value) = read_env("BOOKX_RECOMMENDATIONS_SEED") {
            self.recommendations.seed = Some(parse_named("BOOKX_RECOMMENDATIONS_SEED", &value)?);
        }

        let log_level = read_env("BOOKX_LOGGING_LEVEL").or_else(|| read_env("BOOKX_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = read_env("BOOKX_LOGGING_FORMAT").or_else(|| read_env("BOOKX_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = catalog_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(strategy) = overrides.pricing_strategy {
            self.pricing.strategy = strategy;
        }
        if let Some(strategy) = overrides.recommendation_strategy {
            self.recommendations.strategy = strategy;
        }
        if let Some(limit) = overrides.recommendation_limit {
            self.recommendations.limit = limit;
        }
        if let Some(seed) = overrides.recommendation_seed {
            self.recommendations.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_pricing(&self.pricing)?;
        validate_recommendations(&self.recommendations)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("bookx.toml"), PathBuf::from("config/bookx.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_pricing(pricing: &PricingSettings) -> Result<(), ConfigError> {
    if pricing.min_samples == 0 {
        return Err(ConfigError::Validation(
            "pricing.min_samples must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_recommendations(recommendations: &RecommendationConfig) -> Result<(), ConfigError> {
    if recommendations.limit == 0 || recommendations.limit > MAX_RECOMMENDATION_LIMIT {
        return Err(ConfigError::Validation(format!(
            "recommendations.limit must be in range 1..={MAX_RECOMMENDATION_LIMIT}"
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_named<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    pricing: Option<PricingPatch>,
    recommendations: Option<RecommendationsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    strategy: Option<PricingStrategy>,
    fallback: Option<FallbackPolicy>,
    rounding: Option<Rounding>,
    min_samples: Option<usize>,
    default_min: Option<Decimal>,
    default_avg: Option<Decimal>,
    default_max: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationsPatch {
    strategy: Option<RecommendationStrategy>,
    limit: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
    use crate::pricing::{FallbackPolicy, PricingStrategy, Rounding};
    use crate::recommend::RecommendationStrategy;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> Result<PathBuf, String> {
        let path = dir.path().join("bookx.toml");
        fs::write(&path, body).map_err(|err| err.to_string())?;
        Ok(path)
    }

    #[test]
    fn defaults_load_without_any_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.catalog.path == PathBuf::from("catalog.json"), "default catalog path")?;
        ensure(config.pricing.strategy == PricingStrategy::Empirical, "default pricing strategy")?;
        ensure(config.pricing.default_range.avg() == Decimal::new(15, 0), "default fallback avg")?;
        ensure(config.recommendations.limit == 3, "default recommendation limit")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_BOOKX_EXPORT_DIR", "/srv/exports");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[catalog]
path = "${TEST_BOOKX_EXPORT_DIR}/books.json"
"#,
            )?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.catalog.path == PathBuf::from("/srv/exports/books.json"),
                "catalog path should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_BOOKX_EXPORT_DIR"]);
        result
    }

    #[test]
    fn file_sections_configure_heuristics() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[pricing]
strategy = "blended"
fallback = "model"
rounding = "whole"
min_samples = 5
default_min = 2
default_avg = 8.5
default_max = 20

[recommendations]
strategy = "random"
limit = 6
seed = 42
"#,
        )?;

        let config =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.pricing.strategy == PricingStrategy::Blended, "blended strategy")?;
        ensure(config.pricing.fallback == FallbackPolicy::Model, "model fallback")?;
        ensure(config.pricing.rounding == Rounding::Whole, "whole rounding")?;
        ensure(config.pricing.min_samples == 5, "min samples from file")?;
        ensure(config.pricing.default_range.avg() == Decimal::new(85, 1), "range avg from file")?;
        ensure(
            config.recommendations.strategy == RecommendationStrategy::Random,
            "random recommendations",
        )?;
        ensure(config.recommendations.limit == 6, "limit from file")?;
        ensure(config.recommendations.seed == Some(42), "seed from file")
    }

    #[test]
    fn unordered_default_range_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = write_config(
            &dir,
            r#"
[pricing]
default_min = 40
"#,
        )?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected range validation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("pricing default range")),
            "validation failure should mention the pricing default range",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKX_LOG_LEVEL", "warn");
        env::set_var("BOOKX_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["BOOKX_LOG_LEVEL", "BOOKX_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKX_CATALOG_PATH", "from-env.json");
        env::set_var("BOOKX_PRICING_STRATEGY", "model");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = write_config(
                &dir,
                r#"
[catalog]
path = "from-file.json"

[pricing]
strategy = "condition_adjusted"
rounding = "whole"

[logging]
level = "warn"
"#,
            )?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    catalog_path: Some(PathBuf::from("from-override.json")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.catalog.path == PathBuf::from("from-override.json"),
                "override catalog path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.pricing.strategy == PricingStrategy::Model,
                "env pricing strategy should win over file",
            )?;
            ensure(config.pricing.rounding == Rounding::Whole, "file rounding should survive")
        })();

        clear_vars(&["BOOKX_CATALOG_PATH", "BOOKX_PRICING_STRATEGY"]);
        result
    }

    #[test]
    fn invalid_env_override_names_the_variable() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BOOKX_RECOMMENDATIONS_LIMIT", "lots");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "BOOKX_RECOMMENDATIONS_LIMIT"
                ),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["BOOKX_RECOMMENDATIONS_LIMIT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                recommendation_limit: Some(0),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("recommendations.limit")),
            "validation failure should mention recommendations.limit",
        )
    }

    #[test]
    fn missing_required_file_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let expected = dir.path().join("absent.toml");
        let error = match AppConfig::load(LoadOptions {
            config_path: Some(expected.clone()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing file failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref path) if path == &expected),
            "missing file error should carry the requested path",
        )
    }
}
