//! Student commands - add, import, list, edit and delete roster entries.

use crate::{
    cli::{PortalContext, commands::parse_class, print_json},
    core::{session::Session, student},
    entities::student::StudentClass,
    errors::{Error, Result},
};
use clap::Subcommand;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

/// Student subcommands.
#[derive(Subcommand, Debug)]
pub enum StudentCommand {
    /// Add one student
    Add {
        /// Student ID, e.g. S001
        #[arg(long)]
        code: String,
        /// Full name
        #[arg(long)]
        name: String,
        /// Class: 5, 6 or 7
        #[arg(long, value_parser = parse_class)]
        class: StudentClass,
    },
    /// Import students from a CSV file with columns id,name,studentClass
    Import {
        /// Path to the CSV file
        path: PathBuf,
    },
    /// List the roster
    List,
    /// Change a student's name and class
    Edit {
        /// Student ID of the student to edit
        code: String,
        /// New full name
        #[arg(long)]
        name: String,
        /// New class: 5, 6 or 7
        #[arg(long, value_parser = parse_class)]
        class: StudentClass,
    },
    /// Delete a student and their vaccinations
    Delete {
        /// Student ID of the student to delete
        code: String,
    },
}

/// Reads roster rows from a CSV file. Rows are validated on import.
pub fn read_students_csv(path: &Path) -> Result<Vec<student::NewStudent>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<student::NewStudent>, csv::Error>>()
        .map_err(Into::into)
}

async fn find_by_code(ctx: &PortalContext, code: &str) -> Result<crate::entities::StudentModel> {
    student::get_student_by_code(&ctx.database, code)
        .await?
        .ok_or_else(|| Error::not_found("Student", code))
}

/// Runs a student subcommand.
pub async fn handle(ctx: &PortalContext, session: &Session, command: StudentCommand) -> Result<()> {
    let db = &ctx.database;
    match command {
        StudentCommand::Add { code, name, class } => {
            let created = student::create_student(db, &code, &name, class).await?;
            print_json(&created)
        }
        StudentCommand::Import { path } => {
            let rows = read_students_csv(&path)?;
            let imported = student::import_students(db, rows).await?;
            info!(
                coordinator = session.coordinator(),
                "Imported {} students from {}",
                imported,
                path.display()
            );
            print_json(&json!({ "message": "Students uploaded", "imported": imported }))
        }
        StudentCommand::List => print_json(&student::get_all_students(db).await?),
        StudentCommand::Edit { code, name, class } => {
            let existing = find_by_code(ctx, &code).await?;
            let updated = student::update_student(db, existing.id, &name, class).await?;
            print_json(&updated)
        }
        StudentCommand::Delete { code } => {
            let existing = find_by_code(ctx, &code).await?;
            let removed = student::delete_student(db, existing.id).await?;
            info!(coordinator = session.coordinator(), "Deleted student {}", code);
            print_json(&json!({
                "message": "Student deleted",
                "vaccinations_removed": removed,
            }))
        }
    }
}
