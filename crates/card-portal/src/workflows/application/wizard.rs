use super::blueprint::{AttachmentRule, CardTypeConfig};
use super::domain::{
    ApplicationDraft, CardType, DraftField, ProfilePicture, StagedFile, SubmissionResult,
};
use super::validation::{check_step, validate_step};
use super::views::{
    ConfirmationView, DocumentView, FieldView, SuccessView, SummaryEntry, SummarySection,
    WizardView,
};

/// Lifecycle of a wizard session once the form steps are filled in.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardStage {
    Editing,
    Confirming,
    Submitting,
    Submitted(SubmissionResult),
    /// The registry accepted the application but its reply could not be read.
    Unconfirmed,
}

impl WizardStage {
    pub const fn label(&self) -> &'static str {
        match self {
            WizardStage::Editing => "editing",
            WizardStage::Confirming => "confirming",
            WizardStage::Submitting => "submitting",
            WizardStage::Submitted(_) => "submitted",
            WizardStage::Unconfirmed => "unconfirmed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("{card_type:?} applications do not collect '{field}'")]
    FieldNotCollected {
        field: &'static str,
        card_type: CardType,
    },
    #[error("'{field}' belongs to step {owner}, current step is {current}")]
    FieldNotOnStep {
        field: &'static str,
        owner: usize,
        current: usize,
    },
    #[error("step {step} does not accept this attachment")]
    AttachmentNotOnStep { step: usize },
    #[error("document {index} does not exist ({count} attached)")]
    DocumentOutOfRange { index: usize, count: usize },
    #[error("step {step} ({label}) is incomplete: {}", .missing.join(", "))]
    StepIncomplete {
        step: usize,
        label: &'static str,
        missing: Vec<&'static str>,
    },
    #[error("already on the final step; open the confirmation to continue")]
    AtFinalStep,
    #[error("confirmation is only available from the review step (current step {step})")]
    NotAtReview { step: usize },
    #[error("confirmation is not open")]
    GateClosed,
    #[error("confirmation is open; choose modify or submit")]
    GateOpen,
    #[error("submission already in progress")]
    SubmissionInFlight,
    #[error("application already submitted")]
    AlreadySubmitted,
}

/// One applicant's pass through a card type's steps.
#[derive(Debug, Clone)]
pub struct Wizard {
    config: CardTypeConfig,
    draft: ApplicationDraft,
    current_step: usize,
    stage: WizardStage,
}

impl Wizard {
    pub fn new(card_type: CardType) -> Self {
        let config = CardTypeConfig::for_card(card_type);
        let draft = config.empty_draft();
        Self {
            config,
            draft,
            current_step: 1,
            stage: WizardStage::Editing,
        }
    }

    pub fn card_type(&self) -> CardType {
        self.config.card_type
    }

    pub fn config(&self) -> &CardTypeConfig {
        &self.config
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.config.total_steps()
    }

    pub fn stage(&self) -> &WizardStage {
        &self.stage
    }

    fn ensure_editing(&self) -> Result<(), WizardError> {
        match self.stage {
            WizardStage::Editing => Ok(()),
            WizardStage::Confirming => Err(WizardError::GateOpen),
            WizardStage::Submitting => Err(WizardError::SubmissionInFlight),
            WizardStage::Submitted(_) | WizardStage::Unconfirmed => {
                Err(WizardError::AlreadySubmitted)
            }
        }
    }

    fn current_attachments(&self) -> AttachmentRule {
        self.config
            .step(self.current_step)
            .map(|definition| definition.attachments)
            .unwrap_or(AttachmentRule::None)
    }

    pub fn set_field(
        &mut self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.ensure_editing()?;

        let owner = self
            .config
            .owning_step(field)
            .map(|definition| definition.number)
            .ok_or(WizardError::FieldNotCollected {
                field: field.key(),
                card_type: self.config.card_type,
            })?;
        if owner != self.current_step {
            return Err(WizardError::FieldNotOnStep {
                field: field.key(),
                owner,
                current: self.current_step,
            });
        }

        if !self.draft.put(field, value.into()) {
            return Err(WizardError::FieldNotCollected {
                field: field.key(),
                card_type: self.config.card_type,
            });
        }
        Ok(())
    }

    pub fn set_field_by_key(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        let field =
            DraftField::from_key(key).ok_or_else(|| WizardError::UnknownField(key.to_string()))?;
        self.set_field(field, value)
    }

    /// Stage a document on the current step. Returns the number attached.
    pub fn attach_document(&mut self, file: StagedFile) -> Result<usize, WizardError> {
        self.ensure_editing()?;
        match self.current_attachments() {
            AttachmentRule::Documents { .. } => {
                self.draft.attached_documents.push(file);
                Ok(self.draft.attached_documents.len())
            }
            _ => Err(WizardError::AttachmentNotOnStep {
                step: self.current_step,
            }),
        }
    }

    pub fn remove_document(&mut self, index: usize) -> Result<StagedFile, WizardError> {
        self.ensure_editing()?;
        if !matches!(self.current_attachments(), AttachmentRule::Documents { .. }) {
            return Err(WizardError::AttachmentNotOnStep {
                step: self.current_step,
            });
        }

        let count = self.draft.attached_documents.len();
        if index >= count {
            return Err(WizardError::DocumentOutOfRange { index, count });
        }
        Ok(self.draft.attached_documents.remove(index))
    }

    pub fn set_profile_picture(&mut self, file: StagedFile) -> Result<&ProfilePicture, WizardError> {
        self.ensure_editing()?;
        if self.current_attachments() != AttachmentRule::ProfilePicture {
            return Err(WizardError::AttachmentNotOnStep {
                step: self.current_step,
            });
        }

        Ok(&*self
            .draft
            .profile_picture
            .insert(ProfilePicture::new(file)))
    }

    fn incomplete(&self, step: usize) -> Option<WizardError> {
        if validate_step(&self.config, step, &self.draft) {
            return None;
        }

        let label = self
            .config
            .step(step)
            .map(|definition| definition.label)
            .unwrap_or_default();
        Some(WizardError::StepIncomplete {
            step,
            label,
            missing: check_step(&self.config, step, &self.draft),
        })
    }

    /// Advance one step after the current step validates.
    pub fn next(&mut self) -> Result<usize, WizardError> {
        self.ensure_editing()?;
        if self.current_step >= self.total_steps() {
            return Err(WizardError::AtFinalStep);
        }
        if let Some(error) = self.incomplete(self.current_step) {
            return Err(error);
        }

        self.current_step += 1;
        Ok(self.current_step)
    }

    /// Step back without re-validating. A no-op on the first step.
    pub fn prev(&mut self) -> Result<usize, WizardError> {
        self.ensure_editing()?;
        if self.current_step > 1 {
            self.current_step -= 1;
        }
        Ok(self.current_step)
    }

    pub fn open_confirmation(&mut self) -> Result<ConfirmationView, WizardError> {
        self.ensure_editing()?;
        if self.current_step != self.total_steps() {
            return Err(WizardError::NotAtReview {
                step: self.current_step,
            });
        }
        if let Some(error) = (1..=self.total_steps()).find_map(|step| self.incomplete(step)) {
            return Err(error);
        }

        self.stage = WizardStage::Confirming;
        Ok(self.confirmation_view())
    }

    /// Close the gate and return to the first step, keeping the draft.
    pub fn modify(&mut self) -> Result<usize, WizardError> {
        match self.stage {
            WizardStage::Confirming => {
                self.stage = WizardStage::Editing;
                self.current_step = 1;
                Ok(self.current_step)
            }
            WizardStage::Editing => Err(WizardError::GateClosed),
            WizardStage::Submitting => Err(WizardError::SubmissionInFlight),
            WizardStage::Submitted(_) | WizardStage::Unconfirmed => {
                Err(WizardError::AlreadySubmitted)
            }
        }
    }

    /// Lock the wizard for submission and hand back the draft to transmit.
    pub fn begin_submission(&mut self) -> Result<ApplicationDraft, WizardError> {
        match self.stage {
            WizardStage::Confirming => {
                self.stage = WizardStage::Submitting;
                Ok(self.draft.clone())
            }
            WizardStage::Editing => Err(WizardError::GateClosed),
            WizardStage::Submitting => Err(WizardError::SubmissionInFlight),
            WizardStage::Submitted(_) | WizardStage::Unconfirmed => {
                Err(WizardError::AlreadySubmitted)
            }
        }
    }

    /// Record the created application and discard the draft it was built from.
    pub fn complete_submission(
        &mut self,
        result: SubmissionResult,
    ) -> Result<SuccessView, WizardError> {
        if self.stage != WizardStage::Submitting {
            return Err(WizardError::GateClosed);
        }

        let view = SuccessView::new(result.id, self.card_type());
        self.discard_draft();
        self.stage = WizardStage::Submitted(result);
        Ok(view)
    }

    /// Close the wizard after a create whose reply was unreadable. A retry
    /// could duplicate the record, so no further submission is allowed.
    pub fn settle_unconfirmed(&mut self) {
        if self.stage == WizardStage::Submitting {
            self.discard_draft();
            self.stage = WizardStage::Unconfirmed;
        }
    }

    fn discard_draft(&mut self) {
        self.draft = self.config.empty_draft();
    }

    /// Reopen the gate after a failed primary submission so the user can retry.
    pub fn fail_submission(&mut self) {
        if self.stage == WizardStage::Submitting {
            self.stage = WizardStage::Confirming;
        }
    }

    pub fn success_view(&self) -> Option<SuccessView> {
        match &self.stage {
            WizardStage::Submitted(result) => Some(SuccessView::new(result.id, self.card_type())),
            _ => None,
        }
    }

    fn document_views(&self) -> Vec<DocumentView> {
        self.draft
            .attached_documents
            .iter()
            .map(|file| DocumentView {
                file_name: file.file_name.clone(),
                content_type: file.content_type.clone(),
                size: file.len(),
            })
            .collect()
    }

    pub fn confirmation_view(&self) -> ConfirmationView {
        let sections = self
            .config
            .steps
            .iter()
            .filter(|definition| !definition.fields.is_empty())
            .map(|definition| SummarySection {
                step: definition.number,
                label: definition.label,
                entries: definition
                    .fields
                    .iter()
                    .map(|field| SummaryEntry {
                        key: field.key(),
                        label: field.label(),
                        value: self.draft.value(*field).unwrap_or_default().to_string(),
                    })
                    .collect(),
            })
            .collect();

        ConfirmationView {
            card_type: self.card_type(),
            card_label: self.card_type().label(),
            sections,
            documents: self.document_views(),
            profile_picture_preview: self
                .draft
                .profile_picture
                .as_ref()
                .map(|picture| picture.preview.clone()),
        }
    }

    pub fn view(&self) -> WizardView {
        let definition = self.config.step(self.current_step);
        let fields = definition
            .map(|definition| {
                definition
                    .fields
                    .iter()
                    .map(|field| FieldView {
                        key: field.key(),
                        label: field.label(),
                        value: self.draft.value(*field).unwrap_or_default().to_string(),
                        required: definition.required.contains(field),
                        options: field.options(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let attachments = self.current_attachments();

        WizardView {
            card_type: self.card_type(),
            card_label: self.card_type().label(),
            current_step: self.current_step,
            total_steps: self.total_steps(),
            step_label: definition.map(|d| d.label).unwrap_or_default(),
            stage: self.stage.label(),
            fields,
            documents: self.document_views(),
            accepts_documents: matches!(attachments, AttachmentRule::Documents { .. }),
            accepts_profile_picture: attachments == AttachmentRule::ProfilePicture,
            has_profile_picture: self.draft.profile_picture.is_some(),
        }
    }
}
