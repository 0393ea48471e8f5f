use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::blueprint::SubmissionStrategy;
use super::domain::{ApplicationDraft, CardType, StagedFile, SubmissionResult};
use super::gateway::CardRegistry;
use crate::workflows::registry::RegistryError;

/// Per-file result of the secondary upload phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub file_name: String,
    #[serde(flatten)]
    pub status: UploadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded {
        #[serde(skip_serializing_if = "Option::is_none")]
        stored_as: Option<String>,
    },
    Failed {
        reason: String,
    },
}

/// Outcome of a submission whose primary record was created.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub result: SubmissionResult,
    pub uploads: Vec<UploadOutcome>,
}

impl SubmissionReport {
    pub fn failed_uploads(&self) -> usize {
        self.uploads
            .iter()
            .filter(|outcome| matches!(outcome.status, UploadStatus::Failed { .. }))
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_uploads() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("application could not be submitted: {0}")]
    Primary(#[from] RegistryError),
    #[error("registry accepted the {card_type:?} application but its reply was unreadable: {detail}")]
    Unconfirmed { card_type: CardType, detail: String },
}

/// Two-phase submission: create the record, then transfer documents best-effort.
pub struct SubmissionPipeline<G> {
    registry: Arc<G>,
}

impl<G> SubmissionPipeline<G>
where
    G: CardRegistry + 'static,
{
    pub fn new(registry: Arc<G>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<G> {
        &self.registry
    }

    pub async fn submit(
        &self,
        strategy: SubmissionStrategy,
        draft: &ApplicationDraft,
    ) -> Result<SubmissionReport, SubmissionError> {
        let card_type = draft.card_type();
        info!(
            ?card_type,
            ?strategy,
            documents = draft.attached_documents.len(),
            "submitting application"
        );

        match strategy {
            SubmissionStrategy::PostThenUpload => {
                let result = self.create(card_type, draft).await?;
                let mut uploads = Vec::with_capacity(draft.attached_documents.len());
                for file in &draft.attached_documents {
                    let status = match self
                        .registry
                        .upload_document(card_type, result.id, file)
                        .await
                    {
                        Ok(()) => UploadStatus::Uploaded { stored_as: None },
                        Err(err) => {
                            warn!(
                                application_id = %result.id,
                                file = %file.file_name,
                                error = %err,
                                "document upload failed; application kept"
                            );
                            UploadStatus::Failed {
                                reason: err.to_string(),
                            }
                        }
                    };
                    uploads.push(UploadOutcome {
                        file_name: file.file_name.clone(),
                        status,
                    });
                }
                Ok(SubmissionReport { result, uploads })
            }
            SubmissionStrategy::UploadThenPost => {
                let (stored, uploads) = self
                    .upload_ahead(card_type, &draft.attached_documents)
                    .await;
                let mut body = draft.scalar_payload();
                body.insert(
                    "supportingDocuments".to_string(),
                    Value::Array(stored.into_iter().map(Value::String).collect()),
                );
                let result = self.post(card_type, body).await?;
                Ok(SubmissionReport { result, uploads })
            }
            SubmissionStrategy::PostOnly => {
                if draft.profile_picture.is_some() {
                    debug!(?card_type, "profile picture is staged locally only");
                }
                let result = self.create(card_type, draft).await?;
                Ok(SubmissionReport {
                    result,
                    uploads: Vec::new(),
                })
            }
        }
    }

    async fn create(
        &self,
        card_type: CardType,
        draft: &ApplicationDraft,
    ) -> Result<SubmissionResult, SubmissionError> {
        self.post(card_type, draft.scalar_payload()).await
    }

    async fn post(
        &self,
        card_type: CardType,
        body: serde_json::Map<String, Value>,
    ) -> Result<SubmissionResult, SubmissionError> {
        match self.registry.create_application(card_type, body).await {
            Ok(result) => {
                info!(?card_type, application_id = %result.id, "application created");
                Ok(result)
            }
            Err(RegistryError::Decode(detail)) => {
                warn!(?card_type, %detail, "application accepted without a readable reply");
                Err(SubmissionError::Unconfirmed { card_type, detail })
            }
            Err(err) => {
                warn!(?card_type, error = %err, "application create failed");
                Err(SubmissionError::Primary(err))
            }
        }
    }

    /// Batch upload ahead of creation. A failed batch leaves the name list empty.
    async fn upload_ahead(
        &self,
        card_type: CardType,
        files: &[StagedFile],
    ) -> (Vec<String>, Vec<UploadOutcome>) {
        if files.is_empty() {
            return (Vec::new(), Vec::new());
        }

        match self.registry.upload_documents(card_type, files).await {
            Ok(stored) => {
                let uploads = files
                    .iter()
                    .enumerate()
                    .map(|(index, file)| UploadOutcome {
                        file_name: file.file_name.clone(),
                        status: UploadStatus::Uploaded {
                            stored_as: stored.get(index).cloned(),
                        },
                    })
                    .collect();
                (stored, uploads)
            }
            Err(err) => {
                warn!(
                    ?card_type,
                    files = files.len(),
                    error = %err,
                    "supporting document upload failed; submitting without them"
                );
                let uploads = files
                    .iter()
                    .map(|file| UploadOutcome {
                        file_name: file.file_name.clone(),
                        status: UploadStatus::Failed {
                            reason: err.to_string(),
                        },
                    })
                    .collect();
                (Vec::new(), uploads)
            }
        }
    }
}
