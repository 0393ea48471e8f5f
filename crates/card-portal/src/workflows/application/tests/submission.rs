use std::sync::Arc;

use serde_json::Value;

use super::common::*;
use crate::workflows::application::{
    ApplicationId, CardType, CardTypeConfig, SubmissionError, SubmissionPipeline,
    SubmissionStrategy, UploadStatus,
};
use crate::workflows::registry::RegistryError;

fn pipeline() -> (SubmissionPipeline<RecordingRegistry>, Arc<RecordingRegistry>) {
    let registry = Arc::new(RecordingRegistry::default());
    (SubmissionPipeline::new(registry.clone()), registry)
}

#[test]
fn each_card_type_declares_its_transfer_order() {
    assert_eq!(
        CardTypeConfig::for_card(CardType::Disability).strategy,
        SubmissionStrategy::PostThenUpload
    );
    assert_eq!(
        CardTypeConfig::for_card(CardType::Carers).strategy,
        SubmissionStrategy::UploadThenPost
    );
    assert_eq!(
        CardTypeConfig::for_card(CardType::CustomerSupport).strategy,
        SubmissionStrategy::PostOnly
    );
}

#[tokio::test]
async fn disability_documents_follow_the_created_record() {
    let (pipeline, registry) = pipeline();
    let wizard = wizard_at_review(CardType::Disability, &["report.pdf", "scan.png"]);

    let report = pipeline
        .submit(SubmissionStrategy::PostThenUpload, wizard.draft())
        .await
        .expect("submission succeeds");

    assert_eq!(report.result.id, ApplicationId(41));
    assert!(report.is_complete());
    assert_eq!(
        registry.calls(),
        vec![
            "create DisabilityApplication".to_string(),
            "upload report.pdf".to_string(),
            "upload scan.png".to_string(),
        ]
    );
    let uploaded = registry.uploaded.lock().expect("uploaded mutex").clone();
    assert!(uploaded.iter().all(|(id, _)| *id == ApplicationId(41)));
}

#[tokio::test]
async fn one_failed_upload_does_not_stop_the_others() {
    let (pipeline, registry) = pipeline();
    registry.fail_upload_of("b.pdf");
    let wizard = wizard_at_review(CardType::Disability, &["a.pdf", "b.pdf", "c.pdf"]);

    let report = pipeline
        .submit(SubmissionStrategy::PostThenUpload, wizard.draft())
        .await
        .expect("primary record still created");

    assert_eq!(registry.create_count(), 1);
    assert_eq!(report.uploads.len(), 3);
    assert_eq!(report.failed_uploads(), 1);
    assert!(matches!(
        &report.uploads[1].status,
        UploadStatus::Failed { reason } if reason.contains("file too large")
    ));
    assert_eq!(registry.uploaded.lock().expect("uploaded mutex").len(), 2);
}

#[tokio::test]
async fn carers_documents_are_uploaded_first_and_referenced_by_stored_name() {
    let (pipeline, registry) = pipeline();
    let wizard = wizard_at_review(CardType::Carers, &["guardianship.pdf", "id.png"]);

    let report = pipeline
        .submit(SubmissionStrategy::UploadThenPost, wizard.draft())
        .await
        .expect("submission succeeds");

    assert_eq!(
        registry.calls(),
        vec![
            "upload-documents 2".to_string(),
            "create CarersApplication".to_string(),
        ]
    );
    let body = registry.last_body();
    assert_eq!(
        body.get("supportingDocuments"),
        Some(&serde_json::json!([
            "1717171717-guardianship.pdf",
            "1717171717-id.png"
        ]))
    );
    assert_eq!(
        report.uploads[0].status,
        UploadStatus::Uploaded {
            stored_as: Some("1717171717-guardianship.pdf".to_string())
        }
    );
}

#[tokio::test]
async fn failed_carers_batch_still_creates_the_application() {
    let (pipeline, registry) = pipeline();
    registry.fail_batches_with(RegistryError::Transport("connection reset".to_string()));
    let wizard = wizard_at_review(CardType::Carers, &["guardianship.pdf"]);

    let report = pipeline
        .submit(SubmissionStrategy::UploadThenPost, wizard.draft())
        .await
        .expect("primary record created");

    assert_eq!(registry.create_count(), 1);
    assert_eq!(
        registry.last_body().get("supportingDocuments"),
        Some(&Value::Array(Vec::new()))
    );
    assert_eq!(report.failed_uploads(), 1);
}

#[tokio::test]
async fn primary_failure_skips_document_transfer() {
    let (pipeline, registry) = pipeline();
    registry.fail_creates_with(RegistryError::Rejected {
        status: 500,
        message: "internal error".to_string(),
    });
    let wizard = wizard_at_review(CardType::Disability, &["report.pdf"]);

    let error = pipeline
        .submit(SubmissionStrategy::PostThenUpload, wizard.draft())
        .await
        .expect_err("primary create fails");

    assert!(matches!(
        error,
        SubmissionError::Primary(RegistryError::Rejected { status: 500, .. })
    ));
    assert_eq!(registry.calls(), vec!["create DisabilityApplication".to_string()]);
}

#[tokio::test]
async fn customer_support_posts_scalars_only() {
    let (pipeline, registry) = pipeline();
    let wizard = wizard_at_review(CardType::CustomerSupport, &[]);

    let report = pipeline
        .submit(SubmissionStrategy::PostOnly, wizard.draft())
        .await
        .expect("submission succeeds");

    assert!(report.uploads.is_empty());
    assert_eq!(registry.calls(), vec!["create CustomerSupportApplication".to_string()]);

    let body = registry.last_body();
    assert_eq!(body.get("supportType"), Some(&Value::from("Priority service")));
    assert_eq!(body.get("emergencyContactRelationship"), Some(&Value::from("")));
    assert!(!body.contains_key("profilePicture"));
    assert!(!body.contains_key("disabilityType"));
}

#[tokio::test]
async fn posted_values_are_trimmed() {
    let (pipeline, registry) = pipeline();
    let mut wizard = wizard_at_review(CardType::CustomerSupport, &[]);
    for _ in 1..5 {
        wizard.prev().expect("step back");
    }
    wizard
        .set_field(crate::workflows::application::DraftField::FirstName, "  Amina  ")
        .expect("field accepted");

    pipeline
        .submit(SubmissionStrategy::PostOnly, wizard.draft())
        .await
        .expect("submission succeeds");
    assert_eq!(registry.last_body().get("firstName"), Some(&Value::from("Amina")));
}

#[tokio::test]
async fn unreadable_create_reply_is_reported_as_unconfirmed() {
    let (pipeline, registry) = pipeline();
    registry.garble_create_replies();
    let wizard = wizard_at_review(CardType::Disability, &["report.pdf"]);

    let error = pipeline
        .submit(SubmissionStrategy::PostThenUpload, wizard.draft())
        .await
        .expect_err("reply cannot be read");

    assert!(matches!(
        error,
        SubmissionError::Unconfirmed {
            card_type: CardType::Disability,
            ..
        }
    ));
    assert_eq!(registry.create_count(), 1);
    assert_eq!(registry.calls(), vec!["create DisabilityApplication".to_string()]);
}
