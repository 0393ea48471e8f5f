use std::future::Future;

use serde_json::{Map, Value};

use super::domain::{ApplicationId, CardType, StagedFile, SubmissionResult};
use crate::workflows::registry::RegistryError;

/// Applicant-side view of the external card registry.
///
/// Implementations must return `Send` futures so wizard sessions can be driven
/// from HTTP handlers.
pub trait CardRegistry: Send + Sync {
    /// `POST /{resource}` with the scalar fields as JSON.
    ///
    /// `RegistryError::Decode` means the registry answered 2xx but the reply
    /// could not be read, so the record may exist.
    fn create_application(
        &self,
        card_type: CardType,
        body: Map<String, Value>,
    ) -> impl Future<Output = Result<SubmissionResult, RegistryError>> + Send;

    /// `POST /{resource}/{id}/medical-documents`, one multipart file per call.
    fn upload_document(
        &self,
        card_type: CardType,
        id: ApplicationId,
        file: &StagedFile,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    /// `POST /{resource}/upload-documents`, all files in one multipart call.
    /// Resolves to the names the registry stored them under.
    fn upload_documents(
        &self,
        card_type: CardType,
        files: &[StagedFile],
    ) -> impl Future<Output = Result<Vec<String>, RegistryError>> + Send;
}
