//! Back-office tooling: application review, card issuance, renewals.

mod card_number;
mod console;
pub mod domain;
mod export;
mod filter;
pub mod gateway;


pub use card_number::CardNumberSuggester;
pub use console::{AdminConsole, AdminError, IssuedCard, DEFAULT_RENEWAL_WINDOW_DAYS};
pub use domain::{
    ApplicationStatus, ApplicationSummary, CardRecord, CardStatus, CardTerm, NewCard,
    RenewalRecord, RenewalStatus,
};
pub use export::export_applications_csv;
pub use filter::{ApplicationFilter, CardFilter};
pub use gateway::AdminRegistry;
