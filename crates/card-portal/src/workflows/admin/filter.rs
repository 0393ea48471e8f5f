use super::domain::{ApplicationStatus, ApplicationSummary, CardRecord, CardStatus};
use crate::workflows::application::CardType;

/// Client-side narrowing of the applications table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub card_type: Option<CardType>,
    pub search: Option<String>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &ApplicationSummary) -> bool {
        if let Some(status) = self.status {
            if application.status != status {
                return false;
            }
        }
        if let Some(card_type) = self.card_type {
            if application.card_type != Some(card_type) {
                return false;
            }
        }

        match normalized(self.search.as_deref()) {
            None => true,
            Some(needle) => {
                let id = application.id.to_string();
                [
                    application.first_name.as_str(),
                    application.last_name.as_str(),
                    application.emirates_id.as_str(),
                    application.email.as_str(),
                    application.phone.as_str(),
                    id.as_str(),
                ]
                .iter()
                .any(|value| contains(value, &needle))
                    || contains(&application.full_name(), &needle)
            }
        }
    }

    pub fn apply(&self, applications: &[ApplicationSummary]) -> Vec<ApplicationSummary> {
        applications
            .iter()
            .filter(|application| self.matches(application))
            .cloned()
            .collect()
    }
}

/// Client-side narrowing of the cards table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub status: Option<CardStatus>,
    pub card_type: Option<CardType>,
    pub search: Option<String>,
}

impl CardFilter {
    pub fn matches(&self, card: &CardRecord) -> bool {
        if self.status.is_some_and(|status| card.status != status) {
            return false;
        }
        if self.card_type.is_some_and(|card_type| card.card_type != card_type) {
            return false;
        }

        match normalized(self.search.as_deref()) {
            None => true,
            Some(needle) => [
                card.card_number.as_str(),
                card.holder_name.as_str(),
                card.emirates_id.as_str(),
            ]
            .iter()
            .any(|value| contains(value, &needle)),
        }
    }

    pub fn apply(&self, cards: &[CardRecord]) -> Vec<CardRecord> {
        cards
            .iter()
            .filter(|card| self.matches(card))
            .cloned()
            .collect()
    }
}

fn normalized(search: Option<&str>) -> Option<String> {
    search
        .map(|raw| raw.trim().to_lowercase())
        .filter(|needle| !needle.is_empty())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
