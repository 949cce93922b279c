//! tasklog - log household tasks against a shared spreadsheet
//!
//! # Environment Variables
//!
//! - `TASKLOG__ENDPOINT_URL`: remote endpoint URL (required)
//! - `TASKLOG__SESSION__STORE_PATH`: session file (default `.tasklog/session.json`)
//! - `TASKLOG__SESSION__LOGOUT_DELAY_SECONDS`: delay before a forced sign-out (default 3)
//! - `TASKLOG__HTTP__TIMEOUT_SECONDS`: request timeout (default none)
//! - `TASKLOG__FORM__TASKS`: comma-separated task names
//! - `RUST_LOG`: log filter (default `info`)

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use commands::{Context, SubmitArgs};
use config::CliConfig;
use error::CliError;
use rootcause::Report;
use std::process::ExitCode;
use tasklog_endpoint::EndpointClient;
use tasklog_session::FileSessionStore;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// tasklog - log household tasks
#[derive(Parser, Debug)]
#[command(name = "tasklog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with an identity token, or resume the stored session
    Login {
        /// Signed identity token from the identity provider
        #[arg(long, env = "TASKLOG_CREDENTIAL", hide_env_values = true)]
        credential: Option<String>,
    },
    /// Show who is signed in and their totals
    Status,
    /// Log a task
    Submit(SubmitArgs),
    /// Show earnings, task count and last update
    Summary,
    /// Sign out
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(args: Args) -> Result<(), Report<CliError>> {
    let config = CliConfig::from_env().map_err(|e| CliError::Config {
        details: e.to_string(),
    })?;
    debug!(?config, "loaded configuration");

    let store = FileSessionStore::new(&config.session.store_path);
    let endpoint = EndpointClient::new(&config.endpoint_url, config.http.timeout()).map_err(
        |e| CliError::Endpoint {
            details: e.to_string(),
        },
    )?;
    info!(endpoint = %endpoint.url(), "using endpoint");

    let ctx = Context {
        store: &store,
        oracle: &endpoint,
        log: &endpoint,
        task_options: config.form.options(),
        logout_delay: config.session.logout_delay(),
    };
    let mut out = std::io::stdout().lock();

    match &args.command {
        Command::Login { credential } => {
            commands::login(&ctx, credential.as_deref(), &mut out).await
        }
        Command::Status => commands::status(&ctx, &mut out).await,
        Command::Submit(submit) => commands::submit(&ctx, submit, &mut out).await,
        Command::Summary => commands::summary(&ctx, &mut out).await,
        Command::Logout => commands::logout(&ctx, &mut out).await,
    }
}
