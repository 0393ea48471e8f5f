use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Card products an applicant can apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Disability,
    Carers,
    CustomerSupport,
}

impl CardType {
    pub const ALL: [CardType; 3] = [
        CardType::Disability,
        CardType::Carers,
        CardType::CustomerSupport,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CardType::Disability => "Disability Card",
            CardType::Carers => "Carers Card",
            CardType::CustomerSupport => "Customer Support Card",
        }
    }

    /// REST resource the registry exposes for this card type's applications.
    pub const fn resource(self) -> &'static str {
        match self {
            CardType::Disability => "DisabilityApplication",
            CardType::Carers => "CarersApplication",
            CardType::CustomerSupport => "CustomerSupportApplication",
        }
    }
}

/// Every scalar input a wizard can collect, keyed by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    FirstName,
    LastName,
    EmiratesId,
    DateOfBirth,
    Gender,
    Nationality,
    DisabilityType,
    DisabilityDescription,
    CareRecipientName,
    CareRecipientEmiratesId,
    Relationship,
    SupportType,
    SupportReason,
    Email,
    Phone,
    Emirate,
    Address,
    EmergencyContactName,
    EmergencyContactPhone,
    EmergencyContactRelationship,
}

const GENDERS: &[&str] = &["Male", "Female"];

const EMIRATES: &[&str] = &[
    "Abu Dhabi",
    "Dubai",
    "Sharjah",
    "Ajman",
    "Umm Al Quwain",
    "Ras Al Khaimah",
    "Fujairah",
];

const RELATIONSHIPS: &[&str] = &[
    "Parent", "Child", "Spouse", "Sibling", "Guardian", "Relative", "Other",
];

impl DraftField {
    pub const ALL: [DraftField; 20] = [
        DraftField::FirstName,
        DraftField::LastName,
        DraftField::EmiratesId,
        DraftField::DateOfBirth,
        DraftField::Gender,
        DraftField::Nationality,
        DraftField::DisabilityType,
        DraftField::DisabilityDescription,
        DraftField::CareRecipientName,
        DraftField::CareRecipientEmiratesId,
        DraftField::Relationship,
        DraftField::SupportType,
        DraftField::SupportReason,
        DraftField::Email,
        DraftField::Phone,
        DraftField::Emirate,
        DraftField::Address,
        DraftField::EmergencyContactName,
        DraftField::EmergencyContactPhone,
        DraftField::EmergencyContactRelationship,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            DraftField::FirstName => "firstName",
            DraftField::LastName => "lastName",
            DraftField::EmiratesId => "emiratesId",
            DraftField::DateOfBirth => "dateOfBirth",
            DraftField::Gender => "gender",
            DraftField::Nationality => "nationality",
            DraftField::DisabilityType => "disabilityType",
            DraftField::DisabilityDescription => "disabilityDescription",
            DraftField::CareRecipientName => "careRecipientName",
            DraftField::CareRecipientEmiratesId => "careRecipientEmiratesId",
            DraftField::Relationship => "relationship",
            DraftField::SupportType => "supportType",
            DraftField::SupportReason => "supportReason",
            DraftField::Email => "email",
            DraftField::Phone => "phone",
            DraftField::Emirate => "emirate",
            DraftField::Address => "address",
            DraftField::EmergencyContactName => "emergencyContactName",
            DraftField::EmergencyContactPhone => "emergencyContactPhone",
            DraftField::EmergencyContactRelationship => "emergencyContactRelationship",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DraftField::FirstName => "First name",
            DraftField::LastName => "Last name",
            DraftField::EmiratesId => "Emirates ID",
            DraftField::DateOfBirth => "Date of birth",
            DraftField::Gender => "Gender",
            DraftField::Nationality => "Nationality",
            DraftField::DisabilityType => "Type of disability",
            DraftField::DisabilityDescription => "Disability description",
            DraftField::CareRecipientName => "Care recipient name",
            DraftField::CareRecipientEmiratesId => "Care recipient Emirates ID",
            DraftField::Relationship => "Relationship to care recipient",
            DraftField::SupportType => "Type of support",
            DraftField::SupportReason => "Reason for support",
            DraftField::Email => "Email address",
            DraftField::Phone => "Phone number",
            DraftField::Emirate => "Emirate",
            DraftField::Address => "Address",
            DraftField::EmergencyContactName => "Emergency contact name",
            DraftField::EmergencyContactPhone => "Emergency contact phone",
            DraftField::EmergencyContactRelationship => "Emergency contact relationship",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Closed option list rendered as a select input. Membership is not validated.
    pub const fn options(self) -> Option<&'static [&'static str]> {
        match self {
            DraftField::Gender => Some(GENDERS),
            DraftField::Emirate => Some(EMIRATES),
            DraftField::Relationship | DraftField::EmergencyContactRelationship => {
                Some(RELATIONSHIPS)
            }
            _ => None,
        }
    }
}

/// A file held in memory until the submission pipeline transmits it.
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type
            .and_then(|value| value.trim().parse::<mime::Mime>().ok())
            .map(|parsed| parsed.essence_str().to_string())
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Staged profile picture with the data URL shown on the review summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePicture {
    pub file: StagedFile,
    pub preview: String,
}

impl ProfilePicture {
    pub fn new(file: StagedFile) -> Self {
        let preview = format!(
            "data:{};base64,{}",
            file.content_type,
            B64.encode(&file.bytes)
        );
        Self { file, preview }
    }
}

/// In-memory form state for one wizard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDraft {
    card_type: CardType,
    fields: BTreeMap<DraftField, String>,
    pub attached_documents: Vec<StagedFile>,
    pub profile_picture: Option<ProfilePicture>,
}

impl ApplicationDraft {
    /// Empty draft holding exactly the given field set.
    pub fn new(card_type: CardType, fields: impl IntoIterator<Item = DraftField>) -> Self {
        Self {
            card_type,
            fields: fields
                .into_iter()
                .map(|field| (field, String::new()))
                .collect(),
            attached_documents: Vec::new(),
            profile_picture: None,
        }
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn value(&self, field: DraftField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_filled(&self, field: DraftField) -> bool {
        self.value(field)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn holds(&self, field: DraftField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.fields
            .iter()
            .map(|(field, value)| (*field, value.as_str()))
    }

    /// Returns false when the field is not part of this draft.
    pub(crate) fn put(&mut self, field: DraftField, value: String) -> bool {
        match self.fields.get_mut(&field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Scalar fields as the JSON object posted when creating the application.
    pub fn scalar_payload(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(field, value)| {
                (
                    field.key().to_string(),
                    Value::String(value.trim().to_string()),
                )
            })
            .collect()
    }
}

/// Server-issued identifier of a created application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body returned by the primary create call: the id plus the echoed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub id: ApplicationId,
    #[serde(flatten)]
    pub echoed: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_keys_round_trip_through_lookup() {
        for field in DraftField::ALL {
            assert_eq!(DraftField::from_key(field.key()), Some(field));
            let json = serde_json::to_value(field).expect("serializes");
            assert_eq!(json, Value::String(field.key().to_string()));
        }
        assert_eq!(DraftField::from_key("favouriteColour"), None);
    }

    #[test]
    fn staged_file_guesses_content_type_from_name() {
        let file = StagedFile::new("report.pdf", None, vec![1, 2, 3]);
        assert_eq!(file.content_type, "application/pdf");

        let explicit = StagedFile::new("scan", Some("image/png".to_string()), vec![0]);
        assert_eq!(explicit.content_type, "image/png");

        let unknown = StagedFile::new("blob", Some("  ".to_string()), Vec::new());
        assert_eq!(unknown.content_type, "application/octet-stream");
        assert!(unknown.is_empty());

        let malformed = StagedFile::new("photo.png", Some("not a type".to_string()), vec![0]);
        assert_eq!(malformed.content_type, "image/png");
    }

    #[test]
    fn profile_picture_preview_is_a_data_url() {
        let picture = ProfilePicture::new(StagedFile::new("me.png", None, b"png".to_vec()));
        assert_eq!(picture.preview, "data:image/png;base64,cG5n");
    }

    #[test]
    fn draft_rejects_fields_outside_its_set() {
        let mut draft = ApplicationDraft::new(CardType::Carers, [DraftField::FirstName]);
        assert!(draft.put(DraftField::FirstName, "Mariam".to_string()));
        assert!(!draft.put(DraftField::DisabilityType, "Visual".to_string()));
        assert!(!draft.holds(DraftField::DisabilityType));
        assert_eq!(draft.value(DraftField::FirstName), Some("Mariam"));
    }

    #[test]
    fn submission_result_keeps_echoed_fields() {
        let result: SubmissionResult = serde_json::from_value(serde_json::json!({
            "id": 41,
            "firstName": "Amina",
            "status": "pending"
        }))
        .expect("decodes");
        assert_eq!(result.id, ApplicationId(41));
        assert_eq!(result.echoed.get("firstName"), Some(&Value::from("Amina")));
        assert!(!result.echoed.contains_key("id"));
    }
}
