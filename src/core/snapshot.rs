//! Point-in-time copy of the four portal tables.
//!
//! The dashboard and the report are computed from a [`Snapshot`] so the
//! aggregation itself is a pure function that can be tested without a database.

use crate::{
    entities::{Drive, Student, Vaccination, Vaccine, drive, student, vaccination, vaccine},
    errors::Result,
};
use sea_orm::{QueryOrder, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// All students, vaccines, drives and vaccinations at one moment.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Students in roster order (by code)
    pub students: Vec<student::Model>,
    /// Vaccine catalog in creation order
    pub vaccines: Vec<vaccine::Model>,
    /// Drives in creation order
    pub drives: Vec<drive::Model>,
    /// Vaccinations in creation order
    pub vaccinations: Vec<vaccination::Model>,
}

impl Snapshot {
    /// Reads every table inside one transaction, so the four lists agree with
    /// each other. Nothing is cached between calls.
    #[instrument(skip(db))]
    pub async fn load(db: &DatabaseConnection) -> Result<Self> {
        let txn = db.begin().await?;
        let students = Student::find()
            .order_by_asc(student::Column::Code)
            .all(&txn)
            .await?;
        let vaccines = Vaccine::find()
            .order_by_asc(vaccine::Column::Id)
            .all(&txn)
            .await?;
        let drives = Drive::find()
            .order_by_asc(drive::Column::Id)
            .all(&txn)
            .await?;
        let vaccinations = Vaccination::find()
            .order_by_asc(vaccination::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;

        debug!(
            students = students.len(),
            vaccines = vaccines.len(),
            drives = drives.len(),
            vaccinations = vaccinations.len(),
            "Loaded snapshot"
        );

        Ok(Self {
            students,
            vaccines,
            drives,
            vaccinations,
        })
    }

    /// Drives keyed by id.
    #[must_use]
    pub fn drives_by_id(&self) -> HashMap<i64, &drive::Model> {
        self.drives.iter().map(|d| (d.id, d)).collect()
    }

    /// Vaccinations grouped by student id, each group in creation order.
    #[must_use]
    pub fn vaccinations_by_student(&self) -> HashMap<i64, Vec<&vaccination::Model>> {
        let mut grouped: HashMap<i64, Vec<&vaccination::Model>> = HashMap::new();
        for record in &self.vaccinations {
            grouped.entry(record.student_id).or_default().push(record);
        }
        grouped
    }

    /// Vaccination counts keyed by drive id.
    #[must_use]
    pub fn doses_used_by_drive(&self) -> HashMap<i64, u64> {
        let mut counts: HashMap<i64, u64> = HashMap::new();
        for record in &self.vaccinations {
            *counts.entry(record.drive_id).or_default() += 1;
        }
        counts
    }
}
