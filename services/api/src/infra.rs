use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use card_portal::config::{AppConfig, RegistryConfig};
use card_portal::error::AppError;
use card_portal::workflows::admin::ApplicationStatus;
use card_portal::workflows::application::CardType;
use card_portal::workflows::registry::RegistryClient;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build a registry client from config, honouring a command-line override.
pub(crate) fn registry_client(
    config: &AppConfig,
    override_url: Option<String>,
) -> Result<RegistryClient, AppError> {
    let registry = match override_url {
        Some(url) => RegistryConfig::new(url)?,
        None => config.registry.clone(),
    };
    Ok(RegistryClient::new(&registry))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_card_type(raw: &str) -> Result<CardType, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "disability" => Ok(CardType::Disability),
        "carers" => Ok(CardType::Carers),
        "customer_support" | "support" => Ok(CardType::CustomerSupport),
        _ => Err(format!(
            "unknown card type '{raw}' (expected disability, carers or customer-support)"
        )),
    }
}

pub(crate) fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(raw).ok_or_else(|| {
        format!("unknown status '{raw}' (expected pending, under-review, approved or rejected)")
    })
}
