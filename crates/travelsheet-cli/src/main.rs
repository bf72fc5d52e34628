use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::form::{AddCommand, EditCommand, SettingsFields};
use std::path::PathBuf;
use travelsheet_core::model::SheetKind;

mod commands;

#[derive(Parser)]
#[command(name = "travelsheet")]
#[command(about = "Travelsheet CLI - shared itinerary, expenses and wishlist for a trip", long_about = None)]
struct Cli {
    /// Trip to open (defaults to `trip_id` in config.toml)
    #[arg(long, global = true)]
    trip: Option<String>,

    /// Admin key for this trip; stored for later runs
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the itinerary, optionally for a single day
    Itinerary {
        #[arg(long)]
        date: Option<String>,
    },
    /// List the days that have itinerary entries
    Dates,
    /// Show the expense ledger
    Expenses {
        #[arg(long, default_value = "all")]
        payer: String,
        #[arg(long, default_value = "all")]
        debtor: String,
    },
    /// Show the wishlist
    Wishes {
        /// Required tag; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Flip a wish between open and done
    ToggleWish { ids: Vec<String> },
    /// Tick or untick a checklist line of a wish
    Check { wish_id: String, line: usize },
    /// Delete a record
    Delete {
        sheet: SheetKind,
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Upload images and print their URLs
    Upload { files: Vec<PathBuf> },
    /// Add a record, starting from the usual defaults
    Add {
        #[command(subcommand)]
        form: AddCommand,
    },
    /// Change fields of a stored record
    Edit {
        #[command(subcommand)]
        form: EditCommand,
    },
    /// Show the trip settings, or replace lists and rates
    Settings(SettingsFields),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut app = commands::boot::boot(cli.trip, cli.key).await?;

    let outcome = match cli.command {
        Commands::Itinerary { date } => commands::view::itinerary(&app, date.as_deref()).await,
        Commands::Dates => commands::view::dates(&app).await,
        Commands::Expenses { payer, debtor } => {
            commands::view::expenses(&app, &payer, &debtor).await
        }
        Commands::Wishes { tags, query } => commands::view::wishes(&app, &tags, &query).await,
        Commands::ToggleWish { ids } => commands::edit::toggle_wishes(&app, &ids).await,
        Commands::Check { wish_id, line } => commands::edit::check(&app, &wish_id, line).await,
        Commands::Delete { sheet, id, yes } => commands::edit::delete(&app, sheet, &id, yes).await,
        Commands::Upload { files } => commands::edit::upload(&app, &files).await,
        Commands::Add { form } => commands::form::add(&app, form).await,
        Commands::Edit { form } => commands::form::edit(&app, form).await,
        Commands::Settings(fields) => commands::form::settings(&app, fields).await,
    };

    app.finish().await;
    outcome
}
