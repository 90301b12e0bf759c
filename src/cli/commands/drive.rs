//! Drive commands - scheduling, editing and inspecting drives.

use crate::{
    cli::{PortalContext, print_json},
    core::{drive, schedule, session::Session, vaccination},
    entities::drive as drive_entity,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde_json::json;
use tracing::info;

/// Drive fields for `add`.
#[derive(Args, Debug)]
pub struct DriveArgs {
    /// Drive name
    #[arg(long)]
    pub name: String,
    /// Drive date (YYYY-MM-DD), at least 15 days from today
    #[arg(long)]
    pub date: NaiveDate,
    /// Id of the vaccine administered
    #[arg(long)]
    pub vaccine: i64,
    /// Dose capacity
    #[arg(long, allow_negative_numbers = true)]
    pub doses: i32,
    /// Eligible classes, comma separated (e.g. "5,6")
    #[arg(long, default_value = "")]
    pub classes: String,
    /// Create or leave the drive disabled
    #[arg(long)]
    pub disabled: bool,
}

impl DriveArgs {
    fn into_input(self) -> Result<drive::DriveInput> {
        Ok(drive::DriveInput {
            applicable_classes: drive::parse_classes(&self.classes)?,
            name: self.name,
            date: self.date,
            vaccine_id: self.vaccine,
            total_doses: self.doses,
            enabled: !self.disabled,
        })
    }
}

/// Drive fields for `edit`. Anything left out keeps its stored value.
#[derive(Args, Debug)]
pub struct EditDriveArgs {
    /// New drive name
    #[arg(long)]
    pub name: Option<String>,
    /// New drive date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Id of the new vaccine
    #[arg(long)]
    pub vaccine: Option<i64>,
    /// New dose capacity
    #[arg(long, allow_negative_numbers = true)]
    pub doses: Option<i32>,
    /// New eligible classes, comma separated; an empty string clears them
    #[arg(long)]
    pub classes: Option<String>,
    /// Re-enable the drive
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    /// Disable the drive
    #[arg(long)]
    pub disable: bool,
}

impl EditDriveArgs {
    fn merge_into(self, existing: &drive_entity::Model) -> Result<drive::DriveInput> {
        let applicable_classes = match self.classes {
            Some(classes) => drive::parse_classes(&classes)?,
            None => existing.classes(),
        };
        let enabled = if self.disable {
            false
        } else {
            self.enable || existing.enabled
        };
        Ok(drive::DriveInput {
            name: self.name.unwrap_or_else(|| existing.name.clone()),
            date: self.date.unwrap_or(existing.date),
            vaccine_id: self.vaccine.unwrap_or(existing.vaccine_id),
            total_doses: self.doses.unwrap_or(existing.total_doses),
            enabled,
            applicable_classes,
        })
    }
}

/// Drive subcommands.
#[derive(Subcommand, Debug)]
pub enum DriveCommand {
    /// Schedule a new drive
    Add(DriveArgs),
    /// List all drives with remaining doses
    List,
    /// Show one drive with remaining doses
    Show {
        /// Drive id
        id: i64,
    },
    /// Edit a drive; the date is re-checked against today
    Edit {
        /// Drive id
        id: i64,
        #[command(flatten)]
        fields: EditDriveArgs,
    },
    /// Delete a drive and its vaccinations
    Delete {
        /// Drive id
        id: i64,
    },
    /// List students who can still be vaccinated at a drive
    Eligible {
        /// Drive id
        id: i64,
    },
}

/// Runs a drive subcommand.
pub async fn handle(ctx: &PortalContext, session: &Session, command: DriveCommand) -> Result<()> {
    let db = &ctx.database;
    match command {
        DriveCommand::Add(fields) => {
            let created = drive::create_drive(db, fields.into_input()?, schedule::today()).await?;
            print_json(&created)
        }
        DriveCommand::List => print_json(&drive::get_all_drives_with_doses(db).await?),
        DriveCommand::Show { id } => print_json(&drive::get_drive_with_doses(db, id).await?),
        DriveCommand::Edit { id, fields } => {
            let existing = drive::get_drive_by_id(db, id)
                .await?
                .ok_or_else(|| Error::not_found("Drive", id))?;
            let input = fields.merge_into(&existing)?;
            let updated = drive::update_drive(db, id, input, schedule::today()).await?;
            info!(coordinator = session.coordinator(), "Edited drive {}", id);
            print_json(&updated)
        }
        DriveCommand::Delete { id } => {
            let removed = drive::delete_drive(db, id).await?;
            info!(coordinator = session.coordinator(), "Deleted drive {}", id);
            print_json(&json!({
                "message": "Drive deleted",
                "vaccinations_removed": removed,
            }))
        }
        DriveCommand::Eligible { id } => {
            print_json(&vaccination::eligible_students_for_drive(db, id).await?)
        }
    }
}
