//! Command-line interface - the coordinator's entry point to the portal.
//!
//! Parses arguments, opens a [`Session`] from the supplied credentials, and hands
//! the session to the matching command handler. Handlers only translate between
//! arguments, core operations and JSON/CSV output.

/// Command handlers grouped by entity
pub mod commands;

use crate::{
    config::coordinator::CoordinatorCredentials,
    core::session::{self, Session},
    errors::Result,
};
use clap::{Parser, Subcommand};
use commands::{
    drive::DriveCommand,
    overview::ReportArgs,
    student::StudentCommand,
    vaccination::VaccinationCommand,
    vaccine::VaccineCommand,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(
    name = "vaccination-portal",
    about = "Track school vaccination drives, doses and coverage",
    version
)]
pub struct Cli {
    /// Coordinator email
    #[arg(long, global = true)]
    pub email: Option<String>,
    /// Coordinator password
    #[arg(long, global = true)]
    pub password: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the student roster
    Student {
        #[command(subcommand)]
        command: StudentCommand,
    },
    /// Manage the vaccine catalog
    Vaccine {
        #[command(subcommand)]
        command: VaccineCommand,
    },
    /// Schedule and manage vaccination drives
    Drive {
        #[command(subcommand)]
        command: DriveCommand,
    },
    /// Record, list and remove vaccinations
    Vaccination {
        #[command(subcommand)]
        command: VaccinationCommand,
    },
    /// Show totals, upcoming drives and coverage per vaccine
    Dashboard,
    /// Show one row per student and vaccine
    Report(ReportArgs),
}

/// Shared data available to all command handlers.
pub struct PortalContext {
    /// Database connection for all operations
    pub database: DatabaseConnection,
}

impl PortalContext {
    /// Creates a context around an open connection.
    #[must_use]
    pub const fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Logs in and dispatches one command.
///
/// # Errors
/// Returns [`crate::errors::Error::Unauthorized`] for bad credentials, otherwise
/// whatever the command's core operation returns.
pub async fn run(cli: Cli, ctx: &PortalContext, credentials: &CoordinatorCredentials) -> Result<()> {
    let session = session::login(
        credentials,
        cli.email.as_deref().unwrap_or_default(),
        cli.password.as_deref().unwrap_or_default(),
    )?;
    dispatch(cli.command, ctx, &session).await
}

async fn dispatch(command: Command, ctx: &PortalContext, session: &Session) -> Result<()> {
    match command {
        Command::Student { command } => commands::student::handle(ctx, session, command).await,
        Command::Vaccine { command } => commands::vaccine::handle(ctx, session, command).await,
        Command::Drive { command } => commands::drive::handle(ctx, session, command).await,
        Command::Vaccination { command } => {
            commands::vaccination::handle(ctx, session, command).await
        }
        Command::Dashboard => commands::overview::dashboard(ctx, session).await,
        Command::Report(args) => commands::overview::report(ctx, session, args).await,
    }
}

/// Pretty-prints a value as JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
