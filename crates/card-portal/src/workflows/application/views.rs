use serde::Serialize;

use super::domain::{ApplicationId, CardType};

/// Current-step projection used to render the active wizard page.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub card_type: CardType,
    pub card_label: &'static str,
    pub current_step: usize,
    pub total_steps: usize,
    pub step_label: &'static str,
    pub stage: &'static str,
    pub fields: Vec<FieldView>,
    pub documents: Vec<DocumentView>,
    pub accepts_documents: bool,
    pub accepts_profile_picture: bool,
    pub has_profile_picture: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static [&'static str]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Read-only summary shown on the confirmation gate.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationView {
    pub card_type: CardType,
    pub card_label: &'static str,
    pub sections: Vec<SummarySection>,
    pub documents: Vec<DocumentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_preview: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarySection {
    pub step: usize,
    pub label: &'static str,
    pub entries: Vec<SummaryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Terminal acknowledgement carrying the tracking id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessView {
    pub application_id: ApplicationId,
    pub card_type: CardType,
    pub message: String,
}

impl SuccessView {
    pub fn new(application_id: ApplicationId, card_type: CardType) -> Self {
        Self {
            application_id,
            card_type,
            message: format!(
                "Your {} application has been received. Keep reference #{} to track its progress.",
                card_type.label(),
                application_id
            ),
        }
    }
}
