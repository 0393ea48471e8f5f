use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use card_portal::config::AppConfig;
use card_portal::error::AppError;
use card_portal::telemetry;
use card_portal::workflows::application::WizardService;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{registry_client, AppState};
use crate::routes::with_portal_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(registry_client(&config, args.registry_url.take())?);
    let registry_url = registry.base_url().to_string();
    let wizards = Arc::new(WizardService::new(registry));

    let app = with_portal_routes(wizards)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, registry = %registry_url, "card portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
