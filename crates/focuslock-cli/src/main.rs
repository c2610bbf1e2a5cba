use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use focuslock_application::SessionController;

use crate::commands::write::{SessionEnd, Target};

mod app;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "focuslock")]
#[command(about = "focuslock - write without distractions until you earn your way out", long_about = None)]
struct Cli {
    /// Use this directory for config, documents and logs instead of the
    /// platform defaults
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents, most recently modified first
    List,
    /// Create an empty document and print its id
    New {
        /// Document title
        title: String,
    },
    /// Delete a document (no-op if it does not exist)
    Delete {
        /// Document id
        id: String,
    },
    /// Open a locked writing session
    Write {
        /// Id of the document to open
        #[arg(required_unless_present = "new", conflicts_with = "new")]
        id: Option<String>,
        /// Create a new document with this title and open it
        #[arg(long)]
        new: Option<String>,
    },
}

/// Upper bound on waiting for the network to be restored before exiting.
const NETWORK_SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app = app::bootstrap(cli.data_dir.as_deref())?;
    let log_guard = logging::init(&app.paths, cli.verbose)?;
    let (controller, network_gate) = app.into_controller()?;

    // The controller is consumed so any restore it issues on drop is queued
    // before the gate settles.
    let outcome = dispatch(controller, cli.command).await;
    let settled = tokio::task::spawn_blocking(move || network_gate.settle(NETWORK_SETTLE_TIMEOUT))
        .await
        .unwrap_or(false);
    if !settled {
        tracing::warn!("[Bootstrap] Exiting before network commands completed");
    }

    match outcome? {
        SessionEnd::Terminated(signal) => {
            tracing::info!("[Bootstrap] Exiting after {}", signal);
            drop(log_guard);
            std::process::exit(1);
        }
        SessionEnd::Finished => Ok(()),
    }
}

async fn dispatch(controller: SessionController, command: Commands) -> Result<SessionEnd> {
    match command {
        Commands::List => commands::documents::list(&controller).await?,
        Commands::New { title } => commands::documents::create(&controller, &title).await?,
        Commands::Delete { id } => commands::documents::delete(&controller, &id).await?,
        Commands::Write { id, new } => {
            let target = match (id, new) {
                (_, Some(title)) => Target::New(title),
                (Some(id), None) => Target::Existing(id),
                (None, None) => anyhow::bail!("Either a document id or --new <TITLE> is required"),
            };
            return commands::write::run(controller, target).await;
        }
    }
    Ok(SessionEnd::Finished)
}
