use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::admin::AdminError;
use crate::workflows::application::router::error_response;
use crate::workflows::application::WizardServiceError;
use crate::workflows::registry::RegistryError;

/// Top-level error for the service binary and admin commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("admin error: {0}")]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Wizard(#[from] WizardServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = match self {
            AppError::Wizard(inner) => return error_response(inner),
            other => other,
        };

        let status = match &error {
            AppError::Admin(AdminError::DuplicateCardNumber(_))
            | AppError::Registry(RegistryError::AlreadyExists(_)) => StatusCode::CONFLICT,
            AppError::Admin(AdminError::ApplicationNotFound(_))
            | AppError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Admin(AdminError::Registry(_)) | AppError::Registry(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Admin(AdminError::Export(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Wizard(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": error.to_string() }));
        (status, body).into_response()
    }
}
