use super::blueprint::{AttachmentRule, CardTypeConfig};
use super::domain::ApplicationDraft;

/// Labels of everything the step still needs. Empty means the step passes.
pub fn check_step(config: &CardTypeConfig, step: usize, draft: &ApplicationDraft) -> Vec<&'static str> {
    let Some(definition) = config.step(step) else {
        return Vec::new();
    };

    let mut missing: Vec<&'static str> = definition
        .required
        .iter()
        .filter(|field| !draft.is_filled(**field))
        .map(|field| field.label())
        .collect();

    match definition.attachments {
        AttachmentRule::None => {}
        AttachmentRule::Documents { minimum, label } => {
            if draft.attached_documents.len() < minimum {
                missing.push(label);
            }
        }
        AttachmentRule::ProfilePicture => {
            if draft.profile_picture.is_none() {
                missing.push("Profile picture");
            }
        }
    }

    missing
}

pub fn validate_step(config: &CardTypeConfig, step: usize, draft: &ApplicationDraft) -> bool {
    check_step(config, step, draft).is_empty()
}
