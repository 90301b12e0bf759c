//! Dashboard and report commands.

use crate::{
    cli::{PortalContext, commands::parse_class, print_json},
    core::{dashboard, report, schedule, session::Session},
    entities::student::StudentClass,
    errors::Result,
};
use clap::{Args, ValueEnum};
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::info;

/// Vaccination status filter.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Status {
    /// Vaccinated rows only
    Yes,
    /// Unvaccinated rows only
    No,
}

/// Report options.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Only rows for this vaccine name
    #[arg(long)]
    pub vaccine: Option<String>,
    /// Only rows with this status
    #[arg(long, value_enum)]
    pub status: Option<Status>,
    /// Only rows for this class
    #[arg(long, value_parser = parse_class)]
    pub class: Option<StudentClass>,
    /// Write CSV to this file instead of printing JSON
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Prints the dashboard as of today.
pub async fn dashboard(ctx: &PortalContext, _session: &Session) -> Result<()> {
    let summary = dashboard::generate_dashboard(&ctx.database, schedule::today()).await?;
    print_json(&summary)
}

/// Prints or exports the report.
pub async fn report(ctx: &PortalContext, session: &Session, args: ReportArgs) -> Result<()> {
    let filter = report::ReportFilter {
        vaccine: args.vaccine,
        vaccinated: args.status.map(|s| matches!(s, Status::Yes)),
        student_class: args.class,
    };
    let rows = filter.apply(report::generate_report(&ctx.database).await?);

    match args.csv {
        Some(path) => {
            report::write_report_csv(&rows, BufWriter::new(File::create(&path)?))?;
            info!(
                coordinator = session.coordinator(),
                "Exported {} report rows to {}",
                rows.len(),
                path.display()
            );
            Ok(())
        }
        None => print_json(&rows),
    }
}
