//! Applicant-facing multi-step wizards and the two-phase submission pipeline.

pub mod blueprint;
pub mod domain;
pub mod gateway;
pub mod router;
pub mod service;
pub mod submission;
pub(crate) mod validation;
pub mod views;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use blueprint::{AttachmentRule, CardTypeConfig, StepDefinition, SubmissionStrategy};
pub use domain::{
    ApplicationDraft, ApplicationId, CardType, DraftField, ProfilePicture, StagedFile,
    SubmissionResult,
};
pub use gateway::CardRegistry;
pub use router::application_router;
pub use service::{SubmittedApplication, WizardHandle, WizardService, WizardServiceError};
pub use submission::{
    SubmissionError, SubmissionPipeline, SubmissionReport, UploadOutcome, UploadStatus,
};
pub use validation::{check_step, validate_step};
pub use views::{
    ConfirmationView, DocumentView, FieldView, SuccessView, SummaryEntry, SummarySection,
    WizardView,
};
pub use wizard::{Wizard, WizardError, WizardStage};
