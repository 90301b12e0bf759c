//! Vaccination business logic - recording, removing and listing doses given.
//!
//! [`record_vaccination`] writes with a single conditional statement that
//! applies every admissibility rule, so two concurrent requests can never
//! overfill a drive. [`crate::core::eligibility`] names the rule that refused.

use crate::{
    core::eligibility,
    entities::{
        Drive, Student, Vaccination, Vaccine, drive, student, student::StudentClass, vaccination,
        vaccine,
    },
    errors::{Error, Rejection, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Statement, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

// Inserts only when both rows exist, the drive is enabled and has a dose left,
// the student holds no vaccination for the drive's vaccine, and the student's
// class is in the drive's class list. SQLite dialect.
const CONDITIONAL_INSERT: &str = "\
INSERT INTO vaccinations (student_id, drive_id, created_at) \
SELECT s.id, d.id, ? FROM drives d \
JOIN students s ON s.id = ? \
WHERE d.id = ? \
  AND d.enabled = 1 \
  AND (SELECT COUNT(*) FROM vaccinations v WHERE v.drive_id = d.id) < d.total_doses \
  AND NOT EXISTS ( \
    SELECT 1 FROM vaccinations v \
    JOIN drives o ON o.id = v.drive_id \
    WHERE v.student_id = s.id AND o.vaccine_id = d.vaccine_id) \
  AND (',' || d.applicable_classes || ',') LIKE ('%,' || s.student_class || ',%')";

/// Which vaccinations to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaccinationFilter {
    /// Every vaccination
    All,
    /// Vaccinations given at one drive
    Drive(i64),
    /// Vaccinations for one vaccine, across all of its drives
    Vaccine(i64),
}

/// A vaccination with the student, drive and vaccine it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaccinationDetail {
    /// Vaccination id
    pub id: i64,
    /// Student surrogate id
    pub student_id: i64,
    /// Student code (e.g. "S001")
    pub student_code: String,
    /// Student name
    pub student_name: String,
    /// Student class
    pub student_class: StudentClass,
    /// Drive id
    pub drive_id: i64,
    /// Drive name
    pub drive_name: String,
    /// Drive date
    pub drive_date: NaiveDate,
    /// Vaccine id
    pub vaccine_id: i64,
    /// Vaccine name
    pub vaccine_name: String,
    /// When the vaccination was recorded
    pub created_at: DateTime<Utc>,
}

async fn insert_if_admissible<C>(db: &C, student_id: i64, drive_id: i64) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    let statement = Statement::from_sql_and_values(
        db.get_database_backend(),
        CONDITIONAL_INSERT,
        [Utc::now().into(), student_id.into(), drive_id.into()],
    );
    let result = db.execute(statement).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    let id = i64::try_from(result.last_insert_id())
        .map_err(|_| Error::Database(DbErr::Custom("vaccination id out of range".to_string())))?;
    Ok(Some(id))
}

/// Records that a student received the dose given at a drive.
///
/// The conditional insert is the first statement of the transaction, so it takes
/// the write lock before anything is read and concurrent requests queue behind
/// it. When it inserts nothing, the rules are evaluated to name the reason.
///
/// # Errors
/// - [`Error::NotFound`] when the drive or student does not exist
/// - [`Error::Rejected`] with the first business rule that fails
#[instrument(skip(db))]
pub async fn record_vaccination(
    db: &DatabaseConnection,
    student_id: i64,
    drive_id: i64,
) -> Result<vaccination::Model> {
    let txn = db.begin().await?;

    let Some(id) = insert_if_admissible(&txn, student_id, drive_id).await? else {
        let reason = eligibility::check_vaccination(&txn, student_id, drive_id)
            .await
            .err()
            .unwrap_or(Error::Rejected(Rejection::NoDosesAvailable));
        warn!("Refused vaccination of student {} at drive {}: {}", student_id, drive_id, reason);
        return Err(reason);
    };

    let recorded = Vaccination::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Vaccination", id))?;

    txn.commit().await?;
    info!("Recorded vaccination {} of student {} at drive {}", id, student_id, drive_id);
    Ok(recorded)
}

/// Deletes a vaccination, freeing its dose.
///
/// # Errors
/// Returns [`Error::NotFound`] when the vaccination does not exist.
#[instrument(skip(db))]
pub async fn delete_vaccination(db: &DatabaseConnection, vaccination_id: i64) -> Result<()> {
    let result = Vaccination::delete_by_id(vaccination_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Vaccination", vaccination_id));
    }
    info!("Deleted vaccination {}", vaccination_id);
    Ok(())
}

/// Lists vaccinations with their student, drive and vaccine resolved, oldest first.
pub async fn list_vaccinations(
    db: &DatabaseConnection,
    filter: VaccinationFilter,
) -> Result<Vec<VaccinationDetail>> {
    let mut query = Vaccination::find().order_by_asc(vaccination::Column::Id);
    match filter {
        VaccinationFilter::All => {}
        VaccinationFilter::Drive(drive_id) => {
            query = query.filter(vaccination::Column::DriveId.eq(drive_id));
        }
        VaccinationFilter::Vaccine(vaccine_id) => {
            let drive_ids: Vec<i64> = Drive::find()
                .filter(drive::Column::VaccineId.eq(vaccine_id))
                .all(db)
                .await?
                .into_iter()
                .map(|d| d.id)
                .collect();
            query = query.filter(vaccination::Column::DriveId.is_in(drive_ids));
        }
    }
    let records = query.all(db).await?;

    let student_ids: HashSet<i64> = records.iter().map(|r| r.student_id).collect();
    let students: HashMap<i64, student::Model> = Student::find()
        .filter(student::Column::Id.is_in(student_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let drive_ids: HashSet<i64> = records.iter().map(|r| r.drive_id).collect();
    let drives: HashMap<i64, (drive::Model, Option<vaccine::Model>)> = Drive::find()
        .filter(drive::Column::Id.is_in(drive_ids))
        .find_also_related(Vaccine)
        .all(db)
        .await?
        .into_iter()
        .map(|(d, v)| (d.id, (d, v)))
        .collect();

    let mut details = Vec::with_capacity(records.len());
    for record in records {
        let (Some(student), Some((drive, vaccine))) =
            (students.get(&record.student_id), drives.get(&record.drive_id))
        else {
            warn!("Skipping vaccination {} with a dangling reference", record.id);
            continue;
        };
        details.push(VaccinationDetail {
            id: record.id,
            student_id: student.id,
            student_code: student.code.clone(),
            student_name: student.name.clone(),
            student_class: student.student_class,
            drive_id: drive.id,
            drive_name: drive.name.clone(),
            drive_date: drive.date,
            vaccine_id: drive.vaccine_id,
            vaccine_name: vaccine
                .as_ref()
                .map_or_else(|| "Unknown".to_string(), |v| v.name.clone()),
            created_at: record.created_at,
        });
    }
    Ok(details)
}

/// Students who could be vaccinated at a drive: their class is applicable and
/// they hold no vaccination for the drive's vaccine. Ordered by code.
///
/// Capacity and the enabled flag are not considered here.
///
/// # Errors
/// Returns [`Error::NotFound`] when the drive does not exist.
pub async fn eligible_students_for_drive(
    db: &DatabaseConnection,
    drive_id: i64,
) -> Result<Vec<student::Model>> {
    let drive = Drive::find_by_id(drive_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Drive", drive_id))?;

    let classes = drive.classes();
    if classes.is_empty() {
        return Ok(Vec::new());
    }

    let vaccinated: HashSet<i64> = list_vaccinations(db, VaccinationFilter::Vaccine(drive.vaccine_id))
        .await?
        .into_iter()
        .map(|detail| detail.student_id)
        .collect();

    let students = Student::find()
        .filter(student::Column::StudentClass.is_in(classes))
        .order_by_asc(student::Column::Code)
        .all(db)
        .await?;

    Ok(students
        .into_iter()
        .filter(|s| !vaccinated.contains(&s.id))
        .collect())
}
