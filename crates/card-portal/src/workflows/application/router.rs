use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{CardType, StagedFile};
use super::gateway::CardRegistry;
use super::service::{WizardHandle, WizardService, WizardServiceError};
use super::submission::SubmissionError;
use super::views::WizardView;
use super::wizard::WizardError;

/// Body of `POST /api/v1/wizards`.
#[derive(Debug, Clone, Deserialize)]
pub struct StartWizardRequest {
    pub card_type: CardType,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedWizard {
    pub handle: WizardHandle,
    #[serde(flatten)]
    pub view: WizardView,
}

/// A file sent inline as base64, used for documents and the profile picture.
#[derive(Debug, Clone, Deserialize)]
pub struct FileUpload {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data_base64: String,
}

impl FileUpload {
    fn decode(self) -> Result<StagedFile, base64::DecodeError> {
        let bytes = B64.decode(self.data_base64.trim())?;
        Ok(StagedFile::new(self.file_name, self.content_type, bytes))
    }
}

type SharedService<G> = Arc<WizardService<G>>;

/// Router exposing wizard sessions over HTTP.
pub fn application_router<G>(service: Arc<WizardService<G>>) -> Router
where
    G: CardRegistry + 'static,
{
    Router::new()
        .route("/api/v1/wizards", post(start_handler::<G>))
        .route(
            "/api/v1/wizards/:handle",
            get(view_handler::<G>).delete(abandon_handler::<G>),
        )
        .route("/api/v1/wizards/:handle/fields", put(fields_handler::<G>))
        .route(
            "/api/v1/wizards/:handle/documents",
            post(attach_document_handler::<G>),
        )
        .route(
            "/api/v1/wizards/:handle/documents/:index",
            delete(remove_document_handler::<G>),
        )
        .route(
            "/api/v1/wizards/:handle/profile-picture",
            put(profile_picture_handler::<G>),
        )
        .route("/api/v1/wizards/:handle/next", post(next_handler::<G>))
        .route("/api/v1/wizards/:handle/prev", post(prev_handler::<G>))
        .route(
            "/api/v1/wizards/:handle/confirmation",
            post(confirmation_handler::<G>),
        )
        .route("/api/v1/wizards/:handle/modify", post(modify_handler::<G>))
        .route("/api/v1/wizards/:handle/submit", post(submit_handler::<G>))
        .with_state(service)
}

fn wizard_status(error: &WizardError) -> StatusCode {
    match error {
        WizardError::UnknownField(_)
        | WizardError::FieldNotCollected { .. }
        | WizardError::DocumentOutOfRange { .. } => StatusCode::BAD_REQUEST,
        WizardError::StepIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::FieldNotOnStep { .. }
        | WizardError::AttachmentNotOnStep { .. }
        | WizardError::AtFinalStep
        | WizardError::NotAtReview { .. }
        | WizardError::GateClosed
        | WizardError::GateOpen
        | WizardError::SubmissionInFlight
        | WizardError::AlreadySubmitted => StatusCode::CONFLICT,
    }
}

pub(crate) fn error_response(error: WizardServiceError) -> Response {
    let (status, payload) = match &error {
        WizardServiceError::NotFound(handle) => (
            StatusCode::NOT_FOUND,
            json!({ "error": error.to_string(), "handle": handle }),
        ),
        WizardServiceError::Wizard(WizardError::StepIncomplete { step, missing, .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string(), "step": step, "missing": missing }),
        ),
        WizardServiceError::Wizard(inner) => {
            (wizard_status(inner), json!({ "error": error.to_string() }))
        }
        WizardServiceError::Submission(inner @ SubmissionError::Unconfirmed { .. }) => {
            warn!(error = %inner, "submission outcome unknown; session closed");
            (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "Your application was received but could not be confirmed. Please do not submit it again.",
                    "retry": false,
                }),
            )
        }
        WizardServiceError::Submission(inner) => {
            warn!(error = %inner, "submission failed; draft kept for retry");
            (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "Failed to submit application. Please try again.",
                    "retry": true,
                }),
            )
        }
        WizardServiceError::Poisoned => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
    };
    (status, Json(payload)).into_response()
}

fn view_response<T: Serialize>(result: Result<T, WizardServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn bad_upload(error: base64::DecodeError) -> Response {
    let payload = json!({ "error": format!("file data is not valid base64: {error}") });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) async fn start_handler<G>(
    State(service): State<SharedService<G>>,
    Json(request): Json<StartWizardRequest>,
) -> Response
where
    G: CardRegistry + 'static,
{
    match service.start(request.card_type) {
        Ok((handle, view)) => {
            (StatusCode::CREATED, Json(StartedWizard { handle, view })).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.view(WizardHandle(handle)))
}

pub(crate) async fn abandon_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    match service.abandon(WizardHandle(handle)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fields_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
    Json(values): Json<BTreeMap<String, String>>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.update_fields(WizardHandle(handle), values))
}

pub(crate) async fn attach_document_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
    Json(upload): Json<FileUpload>,
) -> Response
where
    G: CardRegistry + 'static,
{
    match upload.decode() {
        Ok(file) => view_response(service.attach_document(WizardHandle(handle), file)),
        Err(error) => bad_upload(error),
    }
}

pub(crate) async fn remove_document_handler<G>(
    State(service): State<SharedService<G>>,
    Path((handle, index)): Path<(u64, usize)>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.remove_document(WizardHandle(handle), index))
}

pub(crate) async fn profile_picture_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
    Json(upload): Json<FileUpload>,
) -> Response
where
    G: CardRegistry + 'static,
{
    match upload.decode() {
        Ok(file) => view_response(service.set_profile_picture(WizardHandle(handle), file)),
        Err(error) => bad_upload(error),
    }
}

pub(crate) async fn next_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.next(WizardHandle(handle)))
}

pub(crate) async fn prev_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.prev(WizardHandle(handle)))
}

pub(crate) async fn confirmation_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.open_confirmation(WizardHandle(handle)))
}

pub(crate) async fn modify_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    view_response(service.modify(WizardHandle(handle)))
}

pub(crate) async fn submit_handler<G>(
    State(service): State<SharedService<G>>,
    Path(handle): Path<u64>,
) -> Response
where
    G: CardRegistry + 'static,
{
    match service.confirm_and_submit(WizardHandle(handle)).await {
        Ok(submitted) => (StatusCode::CREATED, Json(submitted)).into_response(),
        Err(error) => error_response(error),
    }
}
