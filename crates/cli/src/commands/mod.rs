pub mod browse;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod recommend;
pub mod suggest_price;

use std::str::FromStr;

use bookxchange_core::catalog::Catalog;
use bookxchange_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use bookxchange_core::errors::{ApplicationError, DomainError, InterfaceError};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const EXIT_INTERNAL: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_CATALOG: u8 = 3;
pub const EXIT_INVALID_ARGS: u8 = 4;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                let internal = InterfaceError::Internal {
                    message: error.to_string(),
                    correlation_id: correlation_id(),
                };
                return Self::from_interface(command, &internal);
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            hint: None,
            correlation_id: None,
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure that still carries a structured payload, e.g. a doctor report.
    pub fn failure_with_data(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        data: &impl Serialize,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
            correlation_id: None,
            data: serde_json::to_value(data).ok(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Error class and exit code follow the interface error kind.
    pub fn from_interface(command: &str, error: &InterfaceError) -> Self {
        let (error_class, exit_code) = match error {
            InterfaceError::BadRequest { .. } => ("invalid_argument", EXIT_INVALID_ARGS),
            InterfaceError::ServiceUnavailable { .. } => ("catalog_unavailable", EXIT_CATALOG),
            InterfaceError::Misconfigured { .. } => ("config_validation", EXIT_CONFIG),
            InterfaceError::Internal { .. } => ("internal", EXIT_INTERNAL),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: error.message().to_string(),
            hint: Some(error.user_message().to_string()),
            correlation_id: Some(error.correlation_id().to_string()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn application_failure(command: &str, error: ApplicationError) -> CommandResult {
    CommandResult::from_interface(command, &error.into_interface(correlation_id()))
}

pub(crate) fn invalid_argument(command: &str, message: impl Into<String>) -> CommandResult {
    application_failure(command, DomainError::InvalidArgument(message.into()).into())
}

pub(crate) fn load_config(
    command: &str,
    overrides: ConfigOverrides,
) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions { overrides, ..LoadOptions::default() }).map_err(|error| {
        application_failure(command, ApplicationError::Configuration(error.to_string()))
    })
}

pub(crate) fn load_catalog(command: &str, config: &AppConfig) -> Result<Catalog, CommandResult> {
    Catalog::load(&config.catalog.path)
        .map(|(catalog, _report)| catalog)
        .map_err(|error| application_failure(command, ApplicationError::Catalog(error.to_string())))
}

pub(crate) fn parse_arg<T>(command: &str, name: &str, raw: &str) -> Result<T, CommandResult>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(|error| {
        let error = match error {
            DomainError::InvalidArgument(detail) => {
                DomainError::InvalidArgument(format!("--{name}: {detail}"))
            }
            other => other,
        };
        application_failure(command, error.into())
    })
}

pub(crate) fn parse_optional<T>(
    command: &str,
    name: &str,
    raw: Option<&str>,
) -> Result<Option<T>, CommandResult>
where
    T: FromStr<Err = DomainError>,
{
    raw.map(|value| parse_arg(command, name, value)).transpose()
}
