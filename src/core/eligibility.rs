//! Vaccination admissibility rules.
//!
//! A vaccination request for a (student, drive) pair passes only if, in order:
//! the drive exists, the student exists, the drive is enabled, a dose is left,
//! the student holds no vaccination for the drive's vaccine, and the student's
//! class is applicable. The first failing rule is reported.
//!
//! [`evaluate`] is the pure decision over already-loaded facts;
//! [`check_vaccination`] gathers those facts from the store.

use crate::{
    core::doses,
    entities::{Drive, Student, Vaccination, drive, student, vaccination},
    errors::{Error, Rejection, Result},
};
use sea_orm::{JoinType, PaginatorTrait, QuerySelect, RelationTrait, prelude::*};

/// Everything the rules need to know about one request.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Drive the student would be vaccinated at
    pub drive: &'a drive::Model,
    /// Student requesting the dose
    pub student: &'a student::Model,
    /// Vaccinations already recorded against the drive
    pub doses_used: u64,
    /// Whether the student already holds a vaccination for the drive's vaccine
    pub holds_vaccine: bool,
}

/// Applies the business rules to a fully loaded candidate.
///
/// # Errors
/// Returns the first [`Rejection`] that applies.
pub fn evaluate(candidate: &Candidate<'_>) -> std::result::Result<(), Rejection> {
    let drive = candidate.drive;

    if !drive.enabled {
        return Err(Rejection::DriveDisabled);
    }

    if doses::available_doses(drive.total_doses, candidate.doses_used) == 0 {
        return Err(Rejection::NoDosesAvailable);
    }

    if candidate.holds_vaccine {
        return Err(Rejection::AlreadyVaccinated);
    }

    let class = candidate.student.student_class;
    if !drive.accepts_class(class) {
        return Err(Rejection::ClassNotEligible { class });
    }

    Ok(())
}

/// Whether the student has a vaccination at any drive administering `vaccine_id`.
pub async fn student_holds_vaccine<C>(db: &C, student_id: i64, vaccine_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let existing = Vaccination::find()
        .join(JoinType::InnerJoin, vaccination::Relation::Drive.def())
        .filter(vaccination::Column::StudentId.eq(student_id))
        .filter(drive::Column::VaccineId.eq(vaccine_id))
        .count(db)
        .await?;
    Ok(existing > 0)
}

/// Loads the drive and student and runs [`evaluate`].
///
/// Returns both models when the request is admissible.
///
/// # Errors
/// - [`Error::NotFound`] when the drive or the student does not exist
/// - [`Error::Rejected`] when a business rule fails
pub async fn check_vaccination<C>(
    db: &C,
    student_id: i64,
    drive_id: i64,
) -> Result<(student::Model, drive::Model)>
where
    C: ConnectionTrait,
{
    let drive = Drive::find_by_id(drive_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Drive", drive_id))?;

    let student = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    let doses_used = doses::count_vaccinations(db, drive.id).await?;
    let holds_vaccine = student_holds_vaccine(db, student.id, drive.vaccine_id).await?;

    evaluate(&Candidate {
        drive: &drive,
        student: &student,
        doses_used,
        holds_vaccine,
    })?;

    Ok((student, drive))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::student::StudentClass;
    use chrono::{NaiveDate, Utc};

    fn drive(total_doses: i32, enabled: bool, classes: &str) -> drive::Model {
        drive::Model {
            id: 1,
            name: "Spring MMR".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            vaccine_id: 1,
            total_doses,
            enabled,
            applicable_classes: classes.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn student(class: StudentClass) -> student::Model {
        student::Model {
            id: 1,
            code: "S001".to_string(),
            name: "Asha".to_string(),
            student_class: class,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn candidate<'a>(
        drive: &'a drive::Model,
        student: &'a student::Model,
        doses_used: u64,
        holds_vaccine: bool,
    ) -> Candidate<'a> {
        Candidate {
            drive,
            student,
            doses_used,
            holds_vaccine,
        }
    }

    #[test]
    fn test_admissible_request_passes() {
        let d = drive(5, true, "5,6");
        let s = student(StudentClass::Five);
        assert_eq!(evaluate(&candidate(&d, &s, 4, false)), Ok(()));
    }

    #[test]
    fn test_disabled_drive_wins_over_everything() {
        let d = drive(0, false, "7");
        let s = student(StudentClass::Five);
        assert_eq!(
            evaluate(&candidate(&d, &s, 0, true)),
            Err(Rejection::DriveDisabled)
        );
    }

    #[test]
    fn test_exhausted_drive_is_rejected() {
        let d = drive(2, true, "5");
        let s = student(StudentClass::Five);
        assert_eq!(
            evaluate(&candidate(&d, &s, 2, false)),
            Err(Rejection::NoDosesAvailable)
        );
        assert_eq!(
            evaluate(&candidate(&d, &s, 3, false)),
            Err(Rejection::NoDosesAvailable)
        );
    }

    #[test]
    fn test_duplicate_vaccine_checked_before_class() {
        let d = drive(2, true, "6");
        let s = student(StudentClass::Five);
        assert_eq!(
            evaluate(&candidate(&d, &s, 0, true)),
            Err(Rejection::AlreadyVaccinated)
        );
    }

    #[test]
    fn test_class_must_be_applicable() {
        let d = drive(2, true, "6,7");
        let s = student(StudentClass::Five);
        assert_eq!(
            evaluate(&candidate(&d, &s, 0, false)),
            Err(Rejection::ClassNotEligible {
                class: StudentClass::Five
            })
        );

        let no_classes = drive(2, true, "");
        assert!(evaluate(&candidate(&no_classes, &s, 0, false)).is_err());
    }
}
