mod commands;
mod state;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use warranty::logging::{init_logging, install_panic_hook};
use warranty::{ClaimId, ClaimStatus};

use crate::commands::submit::SubmitArgs;
use crate::state::AppState;

const APP_NAME: &str = "warranty-worker";

#[derive(Debug, Parser)]
#[command(
    name = "warranty-worker",
    version,
    about = "Classify warranty claims from their invoice dates"
)]
struct Cli {
    /// Path to the JSON config file. Defaults apply when omitted.
    #[arg(long, short, global = true, env = "WARRANTY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one reconciliation sweep and exit.
    Run,

    /// Run sweeps on a fixed interval until interrupted.
    Schedule {
        /// Seconds between sweeps (default from config, hourly).
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Store an invoice, create a pending claim and classify it.
    Submit {
        #[arg(long)]
        file: PathBuf,

        /// YYYY-MM-DD or an RFC 3339 timestamp.
        #[arg(long)]
        installation_date: String,

        #[arg(long)]
        owner: i64,

        #[arg(long, default_value = "")]
        customer_name: String,

        #[arg(long, default_value = "")]
        customer_phone: String,

        #[arg(long, default_value = "")]
        product_name: String,
    },

    /// Extract the invoice date from a file without touching any claim.
    Extract {
        #[arg(long)]
        file: PathBuf,
    },

    /// List claims, optionally by status.
    List {
        #[arg(long)]
        status: Option<ClaimStatus>,
    },

    /// Set a claim's status by hand.
    Review {
        #[arg(long)]
        id: ClaimId,

        #[arg(long)]
        status: ClaimStatus,
    },

    /// Print claim counts by status.
    Summary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let state = match AppState::load(cli.config.as_deref()) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}: failed to load configuration: {}", APP_NAME, e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_logging(&state.config.logging, APP_NAME);
    install_panic_hook(APP_NAME);

    let result = match cli.command {
        Command::Run => commands::sweep::run_once(&state),
        Command::Schedule { interval } => commands::sweep::schedule(&state, interval),
        Command::Submit {
            file,
            installation_date,
            owner,
            customer_name,
            customer_phone,
            product_name,
        } => commands::submit::submit(
            &state,
            SubmitArgs {
                file: &file,
                installation_date: &installation_date,
                owner,
                customer_name: &customer_name,
                customer_phone: &customer_phone,
                product_name: &product_name,
            },
        ),
        Command::Extract { file } => commands::submit::extract(&state, &file),
        Command::List { status } => commands::claims::list(&state, status),
        Command::Review { id, status } => commands::claims::review(&state, id, status),
        Command::Summary => commands::claims::summary(&state),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("{}: {:#}", APP_NAME, e);
            ExitCode::FAILURE
        }
    }
}
