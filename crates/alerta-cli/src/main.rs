//! Alerta CLI - campus incident reporting from the terminal
//!
//! Sign in, report incidents, and follow the live incident feed.

mod cli;
mod commands;
mod config;
mod error;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::admin::run_admin;
use crate::commands::auth_cmd::{run_login, run_logout, run_whoami};
use crate::commands::common::AppContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::report::{run_report, ReportArgs};
use crate::commands::watch::run_watch;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "alerta=info,alerta_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell, output }) = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let context = AppContext::load(cli.data_dir, cli.feed_url.as_deref())?;

    match cli.command {
        Some(Commands::Login {
            email,
            password,
            role,
        }) => run_login(&context, &email, &password, role.into())?,
        Some(Commands::Logout) => run_logout(&context),
        Some(Commands::Whoami) => run_whoami(&context)?,
        Some(Commands::Report {
            kind,
            location,
            description,
            urgency,
            timeout,
        }) => {
            let args = ReportArgs {
                kind: kind.into(),
                location,
                description,
                urgency: urgency.into(),
                timeout: Duration::from_secs(timeout),
            };
            run_report(&context, args).await?;
        }
        Some(Commands::Watch {
            status,
            json,
            duration,
        }) => {
            run_watch(
                &context,
                status.map(Into::into),
                json,
                duration.map(Duration::from_secs),
            )
            .await?;
        }
        Some(Commands::Admin { duration }) => {
            run_admin(&context, duration.map(Duration::from_secs)).await?;
        }
        Some(Commands::Config { command }) => run_config(command, &context)?,
        Some(Commands::Completions { .. }) => {}
        None => run_dashboard(&context).await?,
    }

    Ok(())
}

/// `alerta` without a command: the view that matches the session.
async fn run_dashboard(context: &AppContext) -> Result<(), CliError> {
    match context.session.current() {
        None => {
            println!("Not signed in.");
            println!("Run `alerta login --email <email> --password <password>` to get started.");
            Ok(())
        }
        Some(user) if user.role.has_admin_view() => run_admin(context, None).await,
        Some(_) => run_watch(context, None, false, None).await,
    }
}
