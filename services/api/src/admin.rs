use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use card_portal::config::AppConfig;
use card_portal::error::AppError;
use card_portal::telemetry;
use card_portal::workflows::admin::{
    export_applications_csv, AdminConsole, AdminError, ApplicationFilter, ApplicationSummary,
    CardNumberSuggester, CardRecord,
};
use card_portal::workflows::registry::RegistryClient;
use chrono::Local;
use tracing::info;

use crate::cli::{AdminCommand, RegistryArgs};
use crate::infra::registry_client;

pub(crate) async fn run(command: AdminCommand) -> Result<(), AppError> {
    match command {
        AdminCommand::Applications(args) => {
            let console = console(args.registry)?;
            let filter = ApplicationFilter {
                status: args.status,
                card_type: args.card_type,
                search: args.search,
            };
            let applications = console.applications(&filter).await?;

            match args.csv {
                Some(path) => {
                    let file = BufWriter::new(File::create(&path)?);
                    export_applications_csv(file, &applications).map_err(AdminError::from)?;
                    info!(rows = applications.len(), path = %path.display(), "applications exported");
                    println!(
                        "Exported {} application(s) to {}",
                        applications.len(),
                        path.display()
                    );
                }
                None => print_applications(&applications),
            }
            Ok(())
        }
        AdminCommand::UpdateStatus(args) => {
            let id = args.application_id();
            let console = console(args.registry)?;
            let refreshed = console
                .update_status(args.card_type, id, args.status, &ApplicationFilter {
                    card_type: Some(args.card_type),
                    ..ApplicationFilter::default()
                })
                .await?;
            println!(
                "Application #{id} is now {}.",
                args.status.label().replace('_', " ")
            );
            print_applications(&refreshed);
            Ok(())
        }
        AdminCommand::DueForRenewal(args) => {
            let today = args.today.unwrap_or_else(|| Local::now().date_naive());
            let console = console(args.registry)?.with_renewal_window(args.window_days);
            let due = console.cards_due_for_renewal(today).await?;
            println!(
                "Cards due for renewal as of {today} (window {} days)",
                args.window_days
            );
            print_cards(&due);
            Ok(())
        }
        AdminCommand::SuggestCardNumber(args) => {
            let suggester = CardNumberSuggester;
            for _ in 0..args.count.max(1) {
                println!("{}", suggester.suggest(args.card_type));
            }
            Ok(())
        }
    }
}

fn console(args: RegistryArgs) -> Result<AdminConsole<RegistryClient>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let client = registry_client(&config, args.registry_url)?;
    info!(registry = client.base_url(), "admin console connected");
    Ok(AdminConsole::new(Arc::new(client)))
}

fn print_applications(applications: &[ApplicationSummary]) {
    if applications.is_empty() {
        println!("No applications match the filter.");
        return;
    }

    println!(
        "{:<6} {:<28} {:<24} {:<20} {:<13} Submitted",
        "ID", "Card", "Applicant", "Emirates ID", "Status"
    );
    for application in applications {
        let card = application
            .card_type
            .map(|card_type| card_type.label())
            .unwrap_or("-");
        let submitted = application
            .created_at
            .map(|timestamp| timestamp.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<28} {:<24} {:<20} {:<13} {}",
            application.id.to_string(),
            card,
            application.full_name(),
            application.emirates_id,
            application.status.label(),
            submitted
        );
    }
}

fn print_cards(cards: &[CardRecord]) {
    if cards.is_empty() {
        println!("No cards are due for renewal.");
        return;
    }

    println!(
        "{:<14} {:<24} {:<20} {:<12} Status",
        "Card number", "Holder", "Emirates ID", "Expires"
    );
    for card in cards {
        println!(
            "{:<14} {:<24} {:<20} {:<12} {:?}",
            card.card_number,
            card.holder_name,
            card.emirates_id,
            card.expires_on.to_string(),
            card.status
        );
    }
}
