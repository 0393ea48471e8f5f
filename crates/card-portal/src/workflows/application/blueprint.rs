use super::domain::{ApplicationDraft, CardType, DraftField};

/// How the pipeline orders primary creation and document transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStrategy {
    /// Create the application, then upload each document against the returned id.
    PostThenUpload,
    /// Upload all documents in one call, then embed the stored names in the create body.
    UploadThenPost,
    /// Create the application only; staged files stay local.
    PostOnly,
}

/// Attachment requirement owned by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentRule {
    None,
    Documents { minimum: usize, label: &'static str },
    ProfilePicture,
}

#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub number: usize,
    pub label: &'static str,
    pub fields: Vec<DraftField>,
    pub required: Vec<DraftField>,
    pub attachments: AttachmentRule,
}

impl StepDefinition {
    pub fn owns(&self, field: DraftField) -> bool {
        self.fields.contains(&field)
    }
}

/// Declarative wizard definition for a single card type.
#[derive(Debug, Clone)]
pub struct CardTypeConfig {
    pub card_type: CardType,
    pub steps: Vec<StepDefinition>,
    pub strategy: SubmissionStrategy,
}

impl CardTypeConfig {
    pub fn for_card(card_type: CardType) -> Self {
        let (category_step, strategy) = match card_type {
            CardType::Disability => (
                step(
                    "Disability Information",
                    &[DraftField::DisabilityType, DraftField::DisabilityDescription],
                    &[DraftField::DisabilityType],
                    AttachmentRule::Documents {
                        minimum: 1,
                        label: "Medical documents",
                    },
                ),
                SubmissionStrategy::PostThenUpload,
            ),
            CardType::Carers => (
                step(
                    "Care Details",
                    &[
                        DraftField::CareRecipientName,
                        DraftField::CareRecipientEmiratesId,
                        DraftField::Relationship,
                    ],
                    &[
                        DraftField::CareRecipientName,
                        DraftField::CareRecipientEmiratesId,
                        DraftField::Relationship,
                    ],
                    AttachmentRule::Documents {
                        minimum: 1,
                        label: "Supporting documents",
                    },
                ),
                SubmissionStrategy::UploadThenPost,
            ),
            CardType::CustomerSupport => (
                step(
                    "Support Details",
                    &[DraftField::SupportType, DraftField::SupportReason],
                    &[DraftField::SupportType],
                    AttachmentRule::None,
                ),
                SubmissionStrategy::PostOnly,
            ),
        };

        let personal = [
            DraftField::FirstName,
            DraftField::LastName,
            DraftField::EmiratesId,
            DraftField::DateOfBirth,
            DraftField::Gender,
            DraftField::Nationality,
        ];
        let contact = [
            DraftField::Email,
            DraftField::Phone,
            DraftField::Emirate,
            DraftField::Address,
            DraftField::EmergencyContactName,
            DraftField::EmergencyContactPhone,
            DraftField::EmergencyContactRelationship,
        ];

        let mut steps = vec![
            step(
                "Personal Information",
                &personal,
                &personal,
                AttachmentRule::None,
            ),
            category_step,
            step(
                "Contact & Address",
                &contact,
                &contact[..6],
                AttachmentRule::None,
            ),
            step("Photo", &[], &[], AttachmentRule::ProfilePicture),
            step("Review", &[], &[], AttachmentRule::None),
        ];
        for (index, definition) in steps.iter_mut().enumerate() {
            definition.number = index + 1;
        }

        Self {
            card_type,
            steps,
            strategy,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Step by 1-based number.
    pub fn step(&self, number: usize) -> Option<&StepDefinition> {
        number.checked_sub(1).and_then(|index| self.steps.get(index))
    }

    pub fn owning_step(&self, field: DraftField) -> Option<&StepDefinition> {
        self.steps.iter().find(|definition| definition.owns(field))
    }

    pub fn document_step(&self) -> Option<&StepDefinition> {
        self.steps
            .iter()
            .find(|definition| matches!(definition.attachments, AttachmentRule::Documents { .. }))
    }

    pub fn empty_draft(&self) -> ApplicationDraft {
        ApplicationDraft::new(
            self.card_type,
            self.steps
                .iter()
                .flat_map(|definition| definition.fields.iter().copied()),
        )
    }
}

fn step(
    label: &'static str,
    fields: &[DraftField],
    required: &[DraftField],
    attachments: AttachmentRule,
) -> StepDefinition {
    StepDefinition {
        number: 0,
        label,
        fields: fields.to_vec(),
        required: required.to_vec(),
        attachments,
    }
}
