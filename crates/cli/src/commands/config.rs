use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bookxchange_core::config::{AppConfig, ConfigOverrides};
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config(COMMAND, ConfigOverrides::default()) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entries = effective_values(&config)
        .into_iter()
        .map(|effective| ConfigEntry {
            key: effective.key,
            source: field_source(
                effective.key,
                effective.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
            value: effective.value,
        })
        .collect::<Vec<_>>();

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(render_line));

    CommandResult::success_with_data(COMMAND, lines.join("\n"), &entries)
}

struct EffectiveValue {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

fn value(key: &'static str, env_keys: &'static [&'static str], value: String) -> EffectiveValue {
    EffectiveValue { key, env_keys, value }
}

fn effective_values(config: &AppConfig) -> Vec<EffectiveValue> {
    let pricing = &config.pricing;
    let recommendations = &config.recommendations;
    vec![
        value("catalog.path", &["BOOKX_CATALOG_PATH"], config.catalog.path.display().to_string()),
        value("pricing.strategy", &["BOOKX_PRICING_STRATEGY"], format!("{:?}", pricing.strategy)),
        value("pricing.fallback", &["BOOKX_PRICING_FALLBACK"], format!("{:?}", pricing.fallback)),
        value("pricing.rounding", &["BOOKX_PRICING_ROUNDING"], format!("{:?}", pricing.rounding)),
        value(
            "pricing.min_samples",
            &["BOOKX_PRICING_MIN_SAMPLES"],
            pricing.min_samples.to_string(),
        ),
        value("pricing.default_min", &[], pricing.default_range.min().to_string()),
        value("pricing.default_avg", &[], pricing.default_range.avg().to_string()),
        value("pricing.default_max", &[], pricing.default_range.max().to_string()),
        value(
            "recommendations.strategy",
            &["BOOKX_RECOMMENDATIONS_STRATEGY"],
            format!("{:?}", recommendations.strategy),
        ),
        value(
            "recommendations.limit",
            &["BOOKX_RECOMMENDATIONS_LIMIT"],
            recommendations.limit.to_string(),
        ),
        value(
            "recommendations.seed",
            &["BOOKX_RECOMMENDATIONS_SEED"],
            recommendations.seed.map_or_else(|| "<unset>".to_string(), |seed| seed.to_string()),
        ),
        value(
            "logging.level",
            &["BOOKX_LOGGING_LEVEL", "BOOKX_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        value(
            "logging.format",
            &["BOOKX_LOGGING_FORMAT", "BOOKX_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("bookx.toml"), PathBuf::from("config/bookx.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let set_env = env_keys
        .iter()
        .find(|env_key| env::var(env_key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = set_env {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}
