//! Drive entity - a scheduled vaccination event for a single vaccine.
//!
//! A drive has a fixed dose capacity and a set of eligible classes. Remaining
//! capacity is never stored; see [`crate::core::doses`].

use super::student::StudentClass;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Drive database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "drives")]
pub struct Model {
    /// Unique identifier for the drive
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Day the drive takes place
    pub date: Date,
    /// Vaccine administered at this drive
    pub vaccine_id: i64,
    /// Dose capacity
    pub total_doses: i32,
    /// Disabled drives accept no new vaccinations
    pub enabled: bool,
    /// Eligible classes, comma-joined (e.g. `"5,6"`)
    pub applicable_classes: String,
    /// When the drive was created
    pub created_at: DateTimeUtc,
    /// When the drive was last edited
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Eligible classes. Labels that no longer parse are skipped.
    #[must_use]
    pub fn classes(&self) -> Vec<StudentClass> {
        self.applicable_classes
            .split(',')
            .filter_map(|label| label.parse().ok())
            .collect()
    }

    /// Whether students of `class` may be vaccinated at this drive.
    #[must_use]
    pub fn accepts_class(&self, class: StudentClass) -> bool {
        self.classes().contains(&class)
    }
}

/// Defines relationships between Drive and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each drive administers one vaccine
    #[sea_orm(
        belongs_to = "super::vaccine::Entity",
        from = "Column::VaccineId",
        to = "super::vaccine::Column::Id",
        on_delete = "Restrict"
    )]
    Vaccine,
    /// One drive has many vaccinations
    #[sea_orm(has_many = "super::vaccination::Entity")]
    Vaccinations,
}

impl Related<super::vaccine::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vaccine.def()
    }
}

impl Related<super::vaccination::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vaccinations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
