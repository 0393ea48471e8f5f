use std::future::Future;

use super::domain::{ApplicationStatus, ApplicationSummary, CardRecord, NewCard, RenewalRecord};
use crate::workflows::application::{ApplicationId, CardType};
use crate::workflows::registry::RegistryError;

/// Back-office view of the external card registry.
pub trait AdminRegistry: Send + Sync {
    fn list_applications(
        &self,
        card_type: CardType,
    ) -> impl Future<Output = Result<Vec<ApplicationSummary>, RegistryError>> + Send;

    fn update_application_status(
        &self,
        card_type: CardType,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    fn list_cards(&self) -> impl Future<Output = Result<Vec<CardRecord>, RegistryError>> + Send;

    fn create_card(
        &self,
        card: &NewCard,
    ) -> impl Future<Output = Result<CardRecord, RegistryError>> + Send;

    fn list_renewals(
        &self,
    ) -> impl Future<Output = Result<Vec<RenewalRecord>, RegistryError>> + Send;
}
