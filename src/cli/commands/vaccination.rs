//! Vaccination commands - record, list and delete.

use crate::{
    cli::{PortalContext, print_json},
    core::{
        session::Session,
        student,
        vaccination::{self, VaccinationFilter},
    },
    errors::{Error, Result},
};
use clap::Subcommand;
use serde_json::json;
use tracing::info;

/// Vaccination subcommands.
#[derive(Subcommand, Debug)]
pub enum VaccinationCommand {
    /// Record that a student received the dose at a drive
    Record {
        /// Student ID, e.g. S001
        #[arg(long)]
        student: String,
        /// Drive id
        #[arg(long)]
        drive: i64,
    },
    /// List vaccinations, optionally for one drive or one vaccine
    List {
        /// Only this drive
        #[arg(long, conflicts_with = "vaccine")]
        drive: Option<i64>,
        /// Only this vaccine
        #[arg(long)]
        vaccine: Option<i64>,
    },
    /// Delete a vaccination, freeing its dose
    Delete {
        /// Vaccination id
        id: i64,
    },
}

/// Runs a vaccination subcommand.
pub async fn handle(
    ctx: &PortalContext,
    session: &Session,
    command: VaccinationCommand,
) -> Result<()> {
    let db = &ctx.database;
    match command {
        VaccinationCommand::Record {
            student: code,
            drive,
        } => {
            let student = student::get_student_by_code(db, &code)
                .await?
                .ok_or_else(|| Error::not_found("Student", &code))?;
            let recorded = vaccination::record_vaccination(db, student.id, drive).await?;
            info!(
                coordinator = session.coordinator(),
                "Vaccinated {} at drive {}", code, drive
            );
            print_json(&recorded)
        }
        VaccinationCommand::List { drive, vaccine } => {
            let filter = match (drive, vaccine) {
                (Some(drive_id), _) => VaccinationFilter::Drive(drive_id),
                (None, Some(vaccine_id)) => VaccinationFilter::Vaccine(vaccine_id),
                (None, None) => VaccinationFilter::All,
            };
            print_json(&vaccination::list_vaccinations(db, filter).await?)
        }
        VaccinationCommand::Delete { id } => {
            vaccination::delete_vaccination(db, id).await?;
            info!(coordinator = session.coordinator(), "Deleted vaccination {}", id);
            print_json(&json!({ "message": "Vaccination deleted" }))
        }
    }
}
