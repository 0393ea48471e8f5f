use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    ApplicationStatus, ApplicationSummary, CardRecord, NewCard, RenewalRecord,
};
use super::filter::{ApplicationFilter, CardFilter};
use super::gateway::AdminRegistry;
use crate::workflows::application::{ApplicationId, CardType};
use crate::workflows::registry::RegistryError;

pub const DEFAULT_RENEWAL_WINDOW_DAYS: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("card number {0} is already issued")]
    DuplicateCardNumber(String),
    #[error("application {0} was not found")]
    ApplicationNotFound(ApplicationId),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to export applications: {0}")]
    Export(#[from] csv::Error),
}

/// Card created by the console together with the refreshed card list.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCard {
    pub card: CardRecord,
    pub cards: Vec<CardRecord>,
}

/// Back-office operations over the registry. Every write is followed by a
/// re-fetch so callers always render server state.
pub struct AdminConsole<G> {
    registry: Arc<G>,
    renewal_window_days: i64,
}

impl<G> AdminConsole<G>
where
    G: AdminRegistry + 'static,
{
    pub fn new(registry: Arc<G>) -> Self {
        Self {
            registry,
            renewal_window_days: DEFAULT_RENEWAL_WINDOW_DAYS,
        }
    }

    pub fn with_renewal_window(mut self, days: i64) -> Self {
        self.renewal_window_days = days;
        self
    }

    /// Fetch applications for the filtered card types (all when unset), newest first.
    pub async fn applications(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<ApplicationSummary>, AdminError> {
        let card_types = match filter.card_type {
            Some(card_type) => vec![card_type],
            None => CardType::ALL.to_vec(),
        };

        let mut rows = Vec::new();
        for card_type in card_types {
            let mut fetched = self.registry.list_applications(card_type).await?;
            for row in &mut fetched {
                row.card_type.get_or_insert(card_type);
            }
            rows.extend(fetched);
        }

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(filter.apply(&rows))
    }

    pub async fn update_status(
        &self,
        card_type: CardType,
        id: ApplicationId,
        status: ApplicationStatus,
        refresh: &ApplicationFilter,
    ) -> Result<Vec<ApplicationSummary>, AdminError> {
        match self
            .registry
            .update_application_status(card_type, id, status)
            .await
        {
            Ok(()) => info!(application_id = %id, status = status.label(), "application status updated"),
            Err(RegistryError::NotFound(_)) => return Err(AdminError::ApplicationNotFound(id)),
            Err(err) => return Err(err.into()),
        }

        self.applications(refresh).await
    }

    pub async fn cards(&self, filter: &CardFilter) -> Result<Vec<CardRecord>, AdminError> {
        let mut cards = self.registry.list_cards().await?;
        cards.sort_by(|a, b| b.issued_on.cmp(&a.issued_on).then(b.id.cmp(&a.id)));
        Ok(filter.apply(&cards))
    }

    pub async fn cards_due_for_renewal(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<CardRecord>, AdminError> {
        let mut due: Vec<CardRecord> = self
            .registry
            .list_cards()
            .await?
            .into_iter()
            .filter(|card| card.due_for_renewal(today, self.renewal_window_days))
            .collect();
        due.sort_by_key(|card| card.expires_on);
        Ok(due)
    }

    pub async fn renewals(&self) -> Result<Vec<RenewalRecord>, AdminError> {
        let mut renewals = self.registry.list_renewals().await?;
        renewals.sort_by(|a, b| b.requested_on.cmp(&a.requested_on));
        Ok(renewals)
    }

    /// Create a card, distinguishing a taken card number from other failures.
    pub async fn issue_card(
        &self,
        card: NewCard,
        refresh: &CardFilter,
    ) -> Result<IssuedCard, AdminError> {
        let created = match self.registry.create_card(&card).await {
            Ok(created) => created,
            Err(RegistryError::AlreadyExists(message)) => {
                warn!(card_number = %card.card_number, %message, "card number rejected as duplicate");
                return Err(AdminError::DuplicateCardNumber(card.card_number));
            }
            Err(err) => return Err(err.into()),
        };
        info!(card_number = %created.card_number, card_id = created.id, "card issued");

        let cards = self.cards(refresh).await?;
        Ok(IssuedCard {
            card: created,
            cards,
        })
    }
}
