use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::application::{ApplicationId, CardType};

/// Review status the back office assigns to submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "under_review", alias = "underReview")]
    UnderReview,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Some(Self::Pending),
            "under_review" | "underreview" => Some(Self::UnderReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Row of the admin applications table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    #[serde(default)]
    pub card_type: Option<CardType>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub emirates_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ApplicationSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CardStatus {
    #[default]
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "suspended")]
    Suspended,
    #[serde(alias = "expired")]
    Expired,
    #[serde(alias = "revoked")]
    Revoked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: u64,
    pub card_number: String,
    pub card_type: CardType,
    #[serde(default)]
    pub holder_name: String,
    #[serde(default)]
    pub emirates_id: String,
    pub issued_on: NaiveDate,
    pub expires_on: NaiveDate,
    #[serde(default)]
    pub status: CardStatus,
}

impl CardRecord {
    /// Active cards expiring within `window_days` of `today`, or already past expiry.
    pub fn due_for_renewal(&self, today: NaiveDate, window_days: i64) -> bool {
        if matches!(self.status, CardStatus::Revoked | CardStatus::Suspended) {
            return false;
        }
        (self.expires_on - today).num_days() <= window_days
    }
}

/// Validity period applied to newly issued cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTerm {
    pub months: u32,
}

impl Default for CardTerm {
    fn default() -> Self {
        Self { months: 60 }
    }
}

impl CardTerm {
    pub fn expiry_for(&self, issued_on: NaiveDate) -> NaiveDate {
        issued_on
            .checked_add_months(Months::new(self.months))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Body of the card-creation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub card_number: String,
    pub card_type: CardType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub holder_name: String,
    pub emirates_id: String,
    pub issued_on: NaiveDate,
    pub expires_on: NaiveDate,
}

impl NewCard {
    pub fn from_application(
        application: &ApplicationSummary,
        card_type: CardType,
        card_number: String,
        issued_on: NaiveDate,
        term: CardTerm,
    ) -> Self {
        Self {
            card_number,
            card_type,
            application_id: Some(application.id),
            holder_name: application.full_name(),
            emirates_id: application.emirates_id.clone(),
            issued_on,
            expires_on: term.expiry_for(issued_on),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenewalStatus {
    #[default]
    #[serde(alias = "requested")]
    Requested,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
    #[serde(alias = "completed")]
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalRecord {
    pub id: u64,
    pub card_number: String,
    #[serde(default)]
    pub status: RenewalStatus,
    pub requested_on: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}
