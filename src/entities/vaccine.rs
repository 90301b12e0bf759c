//! Vaccine entity - one entry in the vaccine catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vaccine database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vaccines")]
pub struct Model {
    /// Unique identifier for the vaccine
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g. "MMR")
    pub name: String,
    /// Free-form description
    pub description: String,
    /// When the vaccine was added
    pub created_at: DateTimeUtc,
    /// When the vaccine was last edited
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Vaccine and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One vaccine is administered at many drives
    #[sea_orm(has_many = "super::drive::Entity")]
    Drives,
}

impl Related<super::drive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Drives.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
