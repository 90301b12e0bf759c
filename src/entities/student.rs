//! Student entity - a pupil on the school roster.
//!
//! `code` is the human-readable business key (e.g. `S001`) shown in every view;
//! `id` is the surrogate key vaccinations reference.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Grade levels served by the portal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum StudentClass {
    /// Class 5
    #[sea_orm(string_value = "5")]
    #[serde(rename = "5")]
    Five,
    /// Class 6
    #[sea_orm(string_value = "6")]
    #[serde(rename = "6")]
    Six,
    /// Class 7
    #[sea_orm(string_value = "7")]
    #[serde(rename = "7")]
    Seven,
}

impl StudentClass {
    /// Label used in storage, CSV files and messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
        }
    }
}

impl fmt::Display for StudentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StudentClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(Self::Five),
            "6" => Ok(Self::Six),
            "7" => Ok(Self::Seven),
            _ => Err(Error::validation("Student class must be 5, 6, or 7")),
        }
    }
}

/// Student database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Surrogate key
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Real-world student ID (e.g. "S001"), unique across the roster
    #[sea_orm(unique)]
    pub code: String,
    /// Full name
    pub name: String,
    /// Grade level
    pub student_class: StudentClass,
    /// When the student was added
    pub created_at: DateTimeUtc,
    /// When the student was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many vaccinations
    #[sea_orm(has_many = "super::vaccination::Entity")]
    Vaccinations,
}

impl Related<super::vaccination::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vaccinations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
