use bookxchange_core::catalog::Catalog;
use bookxchange_core::config::{AppConfig, LoadOptions};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CATALOG, EXIT_CONFIG};

const COMMAND: &str = "doctor";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let failure = failure_class(&report);

    if !json_output {
        let exit_code = failure.map_or(0, |(_, code)| code);
        return CommandResult { exit_code, output: render_human(&report) };
    }

    match failure {
        None => CommandResult::success_with_data(COMMAND, report.summary.clone(), &report),
        Some((error_class, exit_code)) => CommandResult::failure_with_data(
            COMMAND,
            error_class,
            report.summary.clone(),
            exit_code,
            &report,
        ),
    }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_catalog_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "catalog_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }

    let any_fail = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let any_warn = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = if any_fail {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if any_warn {
        (CheckStatus::Warn, "doctor: ready, with warnings")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_catalog_readiness(config: &AppConfig) -> DoctorCheck {
    let path = config.catalog.path.display().to_string();
    match Catalog::load(&config.catalog.path) {
        Ok((catalog, report)) if catalog.is_empty() => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Warn,
            details: format!(
                "`{path}` holds no usable listings ({} skipped); suggestions will use the fallback",
                report.skipped.len()
            ),
        },
        Ok((_, report)) if !report.skipped.is_empty() => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Warn,
            details: format!(
                "loaded {} listing(s) from `{path}`, skipped {} malformed record(s)",
                report.loaded,
                report.skipped.len()
            ),
        },
        Ok((_, report)) => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Pass,
            details: format!("loaded {} listing(s) from `{path}`", report.loaded),
        },
        Err(error) => DoctorCheck {
            name: "catalog_readiness",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn failure_class(report: &DoctorReport) -> Option<(&'static str, u8)> {
    let failed = report.checks.iter().find(|check| check.status == CheckStatus::Fail)?;
    match failed.name {
        "config_validation" => Some(("config_validation", EXIT_CONFIG)),
        _ => Some(("catalog_unavailable", EXIT_CATALOG)),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
