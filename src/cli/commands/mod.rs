//! Command handlers organized by entity.

/// Drive commands
pub mod drive;
/// Dashboard and report commands
pub mod overview;
/// Student commands
pub mod student;
/// Vaccination commands
pub mod vaccination;
/// Vaccine commands
pub mod vaccine;

use crate::entities::student::StudentClass;

/// clap value parser for class labels.
pub(crate) fn parse_class(value: &str) -> Result<StudentClass, String> {
    value.parse().map_err(|e: crate::errors::Error| e.to_string())
}
