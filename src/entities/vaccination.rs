//! Vaccination entity - the fact that a student received the dose given at a drive.
//!
//! The vaccine is not stored here; it is reached through the drive.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vaccination database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vaccinations")]
pub struct Model {
    /// Unique identifier for the vaccination
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student who received the dose
    pub student_id: i64,
    /// Drive where the dose was given
    pub drive_id: i64,
    /// When the vaccination was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Vaccination and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each vaccination belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
    /// Each vaccination belongs to one drive
    #[sea_orm(
        belongs_to = "super::drive::Entity",
        from = "Column::DriveId",
        to = "super::drive::Column::Id",
        on_delete = "Cascade"
    )]
    Drive,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::drive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Drive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
