use std::path::PathBuf;

use card_portal::error::AppError;
use card_portal::workflows::admin::ApplicationStatus;
use card_portal::workflows::application::{ApplicationId, CardType};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::admin;
use crate::infra::{parse_card_type, parse_date, parse_status};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Card Portal",
    about = "Serve card application wizards and run back-office tasks against the card registry",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Back-office tasks against the card registry
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
pub(crate) enum AdminCommand {
    /// List submitted applications, optionally filtered or exported as CSV
    Applications(ApplicationsArgs),
    /// Set the review status of an application
    UpdateStatus(UpdateStatusArgs),
    /// List cards expiring within the renewal window
    DueForRenewal(RenewalArgs),
    /// Propose a card number for a new card
    SuggestCardNumber(SuggestArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the card registry base URL
    #[arg(long)]
    pub(crate) registry_url: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RegistryArgs {
    /// Override the card registry base URL
    #[arg(long)]
    pub(crate) registry_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ApplicationsArgs {
    #[command(flatten)]
    pub(crate) registry: RegistryArgs,
    /// Only show applications with this status
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<ApplicationStatus>,
    /// Only show applications for this card type
    #[arg(long, value_parser = parse_card_type)]
    pub(crate) card_type: Option<CardType>,
    /// Case-insensitive search over names, Emirates ID, email, phone and id
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Write the filtered list to this CSV file instead of printing it
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct UpdateStatusArgs {
    #[command(flatten)]
    pub(crate) registry: RegistryArgs,
    #[arg(long, value_parser = parse_card_type)]
    pub(crate) card_type: CardType,
    #[arg(long)]
    pub(crate) id: u64,
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: ApplicationStatus,
}

impl UpdateStatusArgs {
    pub(crate) fn application_id(&self) -> ApplicationId {
        ApplicationId(self.id)
    }
}

#[derive(Args, Debug)]
pub(crate) struct RenewalArgs {
    #[command(flatten)]
    pub(crate) registry: RegistryArgs,
    /// Reference date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Days ahead of expiry a card becomes due
    #[arg(long, default_value_t = card_portal::workflows::admin::DEFAULT_RENEWAL_WINDOW_DAYS)]
    pub(crate) window_days: i64,
}

#[derive(Args, Debug)]
pub(crate) struct SuggestArgs {
    #[arg(long, value_parser = parse_card_type)]
    pub(crate) card_type: CardType,
    /// Number of suggestions to print
    #[arg(long, default_value_t = 1)]
    pub(crate) count: usize,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Admin { command } => admin::run(command).await,
    }
}
