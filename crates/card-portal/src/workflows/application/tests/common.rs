use std::sync::Arc;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::workflows::application::{
    ApplicationId, CardRegistry, CardType, DraftField, StagedFile, SubmissionResult, Wizard,
    WizardHandle, WizardService,
};
use crate::workflows::registry::RegistryError;

/// Registry double that records every call and can be told to fail.
#[derive(Default)]
pub(super) struct RecordingRegistry {
    pub(super) calls: Mutex<Vec<String>>,
    pub(super) created: Mutex<Vec<(CardType, Map<String, Value>)>>,
    pub(super) uploaded: Mutex<Vec<(ApplicationId, String)>>,
    create_failure: Mutex<Option<RegistryError>>,
    failing_uploads: Mutex<Vec<String>>,
    batch_failure: Mutex<Option<RegistryError>>,
    unreadable_replies: Mutex<bool>,
}

impl RecordingRegistry {
    pub(super) fn fail_creates_with(&self, error: RegistryError) {
        *self.create_failure.lock().expect("failure mutex") = Some(error);
    }

    pub(super) fn allow_creates(&self) {
        *self.create_failure.lock().expect("failure mutex") = None;
    }

    pub(super) fn fail_upload_of(&self, file_name: &str) {
        self.failing_uploads
            .lock()
            .expect("uploads mutex")
            .push(file_name.to_string());
    }

    pub(super) fn fail_batches_with(&self, error: RegistryError) {
        *self.batch_failure.lock().expect("batch mutex") = Some(error);
    }

    /// Create records as usual but answer with a reply that cannot be decoded.
    pub(super) fn garble_create_replies(&self) {
        *self.unreadable_replies.lock().expect("replies mutex") = true;
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex").clone()
    }

    pub(super) fn create_count(&self) -> usize {
        self.created.lock().expect("created mutex").len()
    }

    pub(super) fn last_body(&self) -> Map<String, Value> {
        self.created
            .lock()
            .expect("created mutex")
            .last()
            .map(|(_, body)| body.clone())
            .expect("an application was created")
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex").push(call);
    }
}

impl CardRegistry for RecordingRegistry {
    async fn create_application(
        &self,
        card_type: CardType,
        body: Map<String, Value>,
    ) -> Result<SubmissionResult, RegistryError> {
        self.record(format!("create {}", card_type.resource()));
        // Let a concurrent confirm observe the in-flight submission.
        tokio::task::yield_now().await;

        if let Some(error) = self.create_failure.lock().expect("failure mutex").clone() {
            return Err(error);
        }

        let mut created = self.created.lock().expect("created mutex");
        let id = ApplicationId(41 + created.len() as u64);
        created.push((card_type, body.clone()));
        if *self.unreadable_replies.lock().expect("replies mutex") {
            return Err(RegistryError::Decode(
                "expected value at line 1 column 1".to_string(),
            ));
        }
        Ok(SubmissionResult { id, echoed: body })
    }

    async fn upload_document(
        &self,
        _card_type: CardType,
        id: ApplicationId,
        file: &StagedFile,
    ) -> Result<(), RegistryError> {
        self.record(format!("upload {}", file.file_name));
        if self
            .failing_uploads
            .lock()
            .expect("uploads mutex")
            .contains(&file.file_name)
        {
            return Err(RegistryError::Rejected {
                status: 413,
                message: "file too large".to_string(),
            });
        }

        self.uploaded
            .lock()
            .expect("uploaded mutex")
            .push((id, file.file_name.clone()));
        Ok(())
    }

    async fn upload_documents(
        &self,
        _card_type: CardType,
        files: &[StagedFile],
    ) -> Result<Vec<String>, RegistryError> {
        self.record(format!("upload-documents {}", files.len()));
        if let Some(error) = self.batch_failure.lock().expect("batch mutex").clone() {
            return Err(error);
        }
        Ok(files
            .iter()
            .map(|file| format!("1717171717-{}", file.file_name))
            .collect())
    }
}

pub(super) fn build_service() -> (Arc<WizardService<RecordingRegistry>>, Arc<RecordingRegistry>) {
    let registry = Arc::new(RecordingRegistry::default());
    let service = Arc::new(WizardService::new(registry.clone()));
    (service, registry)
}

pub(super) fn personal_details() -> Vec<(DraftField, &'static str)> {
    vec![
        (DraftField::FirstName, "Amina"),
        (DraftField::LastName, "Al Mansoori"),
        (DraftField::EmiratesId, "784-1990-1234567-1"),
        (DraftField::DateOfBirth, "1990-04-12"),
        (DraftField::Gender, "Female"),
        (DraftField::Nationality, "Emirati"),
    ]
}

pub(super) fn category_details(card_type: CardType) -> Vec<(DraftField, &'static str)> {
    match card_type {
        CardType::Disability => vec![
            (DraftField::DisabilityType, "Visual"),
            (DraftField::DisabilityDescription, "Low vision"),
        ],
        CardType::Carers => vec![
            (DraftField::CareRecipientName, "Salem Al Mansoori"),
            (DraftField::CareRecipientEmiratesId, "784-1955-7654321-2"),
            (DraftField::Relationship, "Parent"),
        ],
        CardType::CustomerSupport => vec![(DraftField::SupportType, "Priority service")],
    }
}

pub(super) fn contact_details() -> Vec<(DraftField, &'static str)> {
    vec![
        (DraftField::Email, "amina@example.ae"),
        (DraftField::Phone, "+971501234567"),
        (DraftField::Emirate, "Dubai"),
        (DraftField::Address, "Villa 12, Al Barsha"),
        (DraftField::EmergencyContactName, "Omar Al Mansoori"),
        (DraftField::EmergencyContactPhone, "+971507654321"),
    ]
}

pub(super) fn document(name: &str) -> StagedFile {
    StagedFile::new(name, None, format!("contents of {name}").into_bytes())
}

pub(super) fn portrait() -> StagedFile {
    StagedFile::new("portrait.jpg", None, vec![0xff, 0xd8, 0xff])
}

fn fill(wizard: &mut Wizard, values: Vec<(DraftField, &'static str)>) {
    for (field, value) in values {
        wizard.set_field(field, value).expect("field accepted");
    }
}

/// Drive a wizard through every step up to the review page.
pub(super) fn wizard_at_review(card_type: CardType, documents: &[&str]) -> Wizard {
    let mut wizard = Wizard::new(card_type);
    fill(&mut wizard, personal_details());
    wizard.next().expect("personal step complete");

    fill(&mut wizard, category_details(card_type));
    for name in documents {
        wizard.attach_document(document(name)).expect("document accepted");
    }
    wizard.next().expect("category step complete");

    fill(&mut wizard, contact_details());
    wizard.next().expect("contact step complete");

    wizard
        .set_profile_picture(portrait())
        .expect("picture accepted");
    wizard.next().expect("photo step complete");
    wizard
}

fn keyed(values: Vec<(DraftField, &'static str)>) -> Vec<(&'static str, &'static str)> {
    values
        .into_iter()
        .map(|(field, value)| (field.key(), value))
        .collect()
}

/// Same as [`wizard_at_review`] but through the session service.
pub(super) fn session_at_review(
    service: &WizardService<RecordingRegistry>,
    card_type: CardType,
    documents: &[&str],
) -> WizardHandle {
    let (handle, _) = service.start(card_type).expect("session started");
    service
        .update_fields(handle, keyed(personal_details()))
        .expect("personal fields");
    service.next(handle).expect("personal step complete");

    service
        .update_fields(handle, keyed(category_details(card_type)))
        .expect("category fields");
    for name in documents {
        service
            .attach_document(handle, document(name))
            .expect("document accepted");
    }
    service.next(handle).expect("category step complete");

    service
        .update_fields(handle, keyed(contact_details()))
        .expect("contact fields");
    service.next(handle).expect("contact step complete");

    service
        .set_profile_picture(handle, portrait())
        .expect("picture accepted");
    service.next(handle).expect("photo step complete");
    handle
}
