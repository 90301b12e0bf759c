//! Unified error types for the vaccination portal.
//!
//! Every core operation returns [`Result`]. The variants map onto four kinds the
//! request boundary cares about (see [`ErrorKind`]): bad input, missing
//! references, business rule rejections, and store failures.

use crate::{core::schedule::MIN_LEAD_DAYS, entities::student::StudentClass};
use chrono::NaiveDate;
use thiserror::Error;

/// A business rule refused the requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Disabled drives accept no new vaccinations.
    #[error("Cannot add vaccination to a disabled drive")]
    DriveDisabled,

    /// Every dose of the drive is already accounted for.
    #[error("No doses available for this drive")]
    NoDosesAvailable,

    /// The student already holds a vaccination for the drive's vaccine.
    #[error("Student already vaccinated with this vaccine")]
    AlreadyVaccinated,

    /// The student's class is not in the drive's applicable classes.
    #[error("Class {class} is not eligible for this drive")]
    ClassNotEligible {
        /// Class of the rejected student
        class: StudentClass,
    },

    /// The drive date is inside the minimum scheduling lead time.
    #[error(
        "Drive must be scheduled at least {} days in advance (on or after {earliest})",
        MIN_LEAD_DAYS
    )]
    DateTooSoon {
        /// First date that would have been accepted
        earliest: NaiveDate,
    },

    /// A drive with recorded vaccinations cannot switch to another vaccine.
    #[error("Cannot change the vaccine of a drive with {vaccinations} recorded vaccination(s)")]
    VaccineLocked {
        /// Vaccinations already recorded at the drive
        vaccinations: u64,
    },

    /// Vaccines referenced by drives cannot be deleted.
    #[error("Vaccine is used by {drives} drive(s) and cannot be deleted")]
    VaccineInUse {
        /// Number of drives referencing the vaccine
        drives: u64,
    },
}

/// Main error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used when turning an [`Error`] into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input
    Validation,
    /// A referenced record does not exist
    NotFound,
    /// A business rule refused the change
    BusinessRule,
    /// Missing or wrong session credentials
    Unauthorized,
    /// Store, I/O or configuration failure
    Internal,
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Rejected(_) => ErrorKind::BusinessRule,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Csv(_)
            | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show to the coordinator.
    ///
    /// Rule violations keep their specific wording; internal failures collapse to
    /// a generic "Server error".
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
