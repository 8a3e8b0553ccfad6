//! EventHub CLI - Scripted access to the EventHub REST API.
//!
//! # Usage
//!
//! ```bash
//! export EVENTHUB_API_URL=http://localhost:8000/api
//! export EVENTHUB_API_TOKEN=eyJhbGciOi...
//!
//! # List inactive teambuildings
//! eventhub teambuildings list --status inactive
//!
//! # Next five events
//! eventhub events upcoming --limit 5
//!
//! # Confirm a registration
//! eventhub registrations set-status 42 confirmed
//! ```
//!
//! Every command prints the backend's JSON response on stdout. Logs go to
//! stderr (`RUST_LOG` controls the level).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eventhub_core::{EventId, RegistrationId, RegistrationStatus, TeambuildingId, TeambuildingStatus};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "eventhub")]
#[command(author, version, about = "EventHub admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage teambuilding programs
    Teambuildings {
        #[command(subcommand)]
        action: TeambuildingAction,
    },
    /// Manage events
    Events {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Manage registrations
    Registrations {
        #[command(subcommand)]
        action: RegistrationAction,
    },
    /// Show dashboard statistics
    Dashboard,
    /// Upload an image and print its URL
    Upload {
        /// Image file to upload
        path: PathBuf,
    },
    /// Show the profile the token belongs to
    Whoami,
}

#[derive(Subcommand)]
enum TeambuildingAction {
    /// List teambuildings
    List {
        /// Only teambuildings in this status (active, inactive, completed, cancelled)
        #[arg(short, long)]
        status: Option<TeambuildingStatus>,
    },
    /// List active teambuildings
    Active,
    /// Show one teambuilding
    Show { id: TeambuildingId },
    /// Delete a teambuilding
    Delete { id: TeambuildingId },
}

#[derive(Subcommand)]
enum EventAction {
    /// List events
    List {
        /// Only events of this teambuilding
        #[arg(short, long)]
        teambuilding: Option<TeambuildingId>,
    },
    /// List upcoming events
    Upcoming {
        /// Maximum number of events
        #[arg(short, long, default_value_t = commands::events::DEFAULT_UPCOMING_LIMIT)]
        limit: u32,
    },
    /// Show one event
    Show { id: EventId },
    /// Show remaining capacity of an event
    Availability { id: EventId },
    /// Delete an event
    Delete { id: EventId },
}

#[derive(Subcommand)]
enum RegistrationAction {
    /// List registrations
    List {
        /// Only registrations for this event
        #[arg(short, long, conflicts_with = "status")]
        event: Option<EventId>,

        /// Only registrations in this status (pending, confirmed, cancelled)
        #[arg(short, long)]
        status: Option<RegistrationStatus>,
    },
    /// List the token owner's registrations
    Mine,
    /// Change the status of a registration
    SetStatus {
        id: RegistrationId,
        status: RegistrationStatus,
    },
    /// Delete a registration
    Delete { id: RegistrationId },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => {}
        Err(CliError::TokenRejected) => {
            tracing::error!("API token rejected; set a fresh EVENTHUB_API_TOKEN");
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let api = commands::connect()?;

    match cli.command {
        Commands::Teambuildings { action } => match action {
            TeambuildingAction::List { status } => commands::teambuildings::list(&api, status).await,
            TeambuildingAction::Active => commands::teambuildings::active(&api).await,
            TeambuildingAction::Show { id } => commands::teambuildings::show(&api, id).await,
            TeambuildingAction::Delete { id } => commands::teambuildings::delete(&api, id).await,
        },
        Commands::Events { action } => match action {
            EventAction::List { teambuilding } => commands::events::list(&api, teambuilding).await,
            EventAction::Upcoming { limit } => commands::events::upcoming(&api, limit).await,
            EventAction::Show { id } => commands::events::show(&api, id).await,
            EventAction::Availability { id } => commands::events::availability(&api, id).await,
            EventAction::Delete { id } => commands::events::delete(&api, id).await,
        },
        Commands::Registrations { action } => match action {
            RegistrationAction::List { event, status } => {
                commands::registrations::list(&api, event, status).await
            }
            RegistrationAction::Mine => commands::registrations::mine(&api).await,
            RegistrationAction::SetStatus { id, status } => {
                commands::registrations::set_status(&api, id, status).await
            }
            RegistrationAction::Delete { id } => commands::registrations::delete(&api, id).await,
        },
        Commands::Dashboard => commands::account::dashboard(&api).await,
        Commands::Upload { path } => commands::account::upload(&api, &path).await,
        Commands::Whoami => commands::account::whoami(&api).await,
    }
}
