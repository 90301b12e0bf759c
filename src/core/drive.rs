//! Drive business logic - scheduling and maintaining vaccination drives.
//!
//! Every create and edit re-checks the lead-time rule against the day of the
//! change. Reads always come back with the remaining dose count attached.

use crate::{
    core::{doses, schedule, vaccine::get_vaccine_by_id},
    entities::{Drive, Vaccination, Vaccine, drive, student::StudentClass, vaccination},
    errors::{Error, Rejection, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, instrument};

/// Fields a coordinator supplies when creating or editing a drive.
#[derive(Debug, Clone)]
pub struct DriveInput {
    /// Display name
    pub name: String,
    /// Day of the drive
    pub date: NaiveDate,
    /// Vaccine administered
    pub vaccine_id: i64,
    /// Dose capacity
    pub total_doses: i32,
    /// Whether the drive accepts vaccinations
    pub enabled: bool,
    /// Eligible classes
    pub applicable_classes: Vec<StudentClass>,
}

/// A drive together with its vaccine name and remaining doses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveWithDoses {
    /// The stored drive
    #[serde(flatten)]
    pub drive: drive::Model,
    /// Name of the drive's vaccine
    pub vaccine_name: String,
    /// Doses still available, derived at read time
    pub available_doses: u64,
}

/// Parses a comma-separated class list such as `"5, 6"`.
///
/// Blank entries are ignored and duplicates collapse.
///
/// # Errors
/// Returns [`Error::Validation`] for any label other than 5, 6 or 7.
pub fn parse_classes(input: &str) -> Result<Vec<StudentClass>> {
    let mut classes = input
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<StudentClass>>>()?;
    classes.sort_unstable();
    classes.dedup();
    Ok(classes)
}

/// Joins classes into the stored comma-separated form.
#[must_use]
pub fn join_classes(classes: &[StudentClass]) -> String {
    let mut classes = classes.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
        .iter()
        .map(|class| class.label())
        .collect::<Vec<_>>()
        .join(",")
}

fn validate_input(input: &DriveInput, today: NaiveDate) -> Result<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(Error::validation(
            "Name, date, vaccine, and total doses are required",
        ));
    }
    if input.total_doses < 0 {
        return Err(Error::validation("Total doses cannot be negative"));
    }
    schedule::validate_drive_date(input.date, today)?;
    Ok(name.to_string())
}

async fn with_doses<C>(db: &C, drive: drive::Model) -> Result<DriveWithDoses>
where
    C: ConnectionTrait,
{
    let vaccine_name = get_vaccine_by_id(db, drive.vaccine_id)
        .await?
        .map_or_else(|| "Unknown".to_string(), |v| v.name);
    let available_doses = doses::available_doses_for_drive(db, &drive).await?;
    Ok(DriveWithDoses {
        drive,
        vaccine_name,
        available_doses,
    })
}

/// Schedules a new drive.
///
/// # Errors
/// - [`Error::Validation`] for a blank name or negative capacity
/// - [`crate::errors::Rejection::DateTooSoon`] when the date is under the lead time
/// - [`Error::NotFound`] when the vaccine does not exist
#[instrument(skip(db))]
pub async fn create_drive(
    db: &DatabaseConnection,
    input: DriveInput,
    today: NaiveDate,
) -> Result<DriveWithDoses> {
    let name = validate_input(&input, today)?;
    let vaccine = get_vaccine_by_id(db, input.vaccine_id)
        .await?
        .ok_or_else(|| Error::not_found("Vaccine", input.vaccine_id))?;

    let now = chrono::Utc::now();
    let drive = drive::ActiveModel {
        name: Set(name),
        date: Set(input.date),
        vaccine_id: Set(vaccine.id),
        total_doses: Set(input.total_doses),
        enabled: Set(input.enabled),
        applicable_classes: Set(join_classes(&input.applicable_classes)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Scheduled drive {} on {} for {}", drive.name, drive.date, vaccine.name);
    let available_doses = doses::available_doses(drive.total_doses, 0);
    Ok(DriveWithDoses {
        drive,
        vaccine_name: vaccine.name,
        available_doses,
    })
}

/// Edits a drive, re-validating the date against `today`.
///
/// Capacity may not drop below the doses already given, and the vaccine is fixed
/// once any vaccination has been recorded at the drive.
///
/// # Errors
/// Same as [`create_drive`], plus [`Error::NotFound`] for an unknown drive,
/// [`Error::Validation`] when the new capacity is below the vaccinations recorded,
/// and [`Rejection::VaccineLocked`] when switching the vaccine of a used drive.
#[instrument(skip(db))]
pub async fn update_drive(
    db: &DatabaseConnection,
    drive_id: i64,
    input: DriveInput,
    today: NaiveDate,
) -> Result<DriveWithDoses> {
    let name = validate_input(&input, today)?;

    let txn = db.begin().await?;

    let existing = Drive::find_by_id(drive_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Drive", drive_id))?;
    let vaccine = get_vaccine_by_id(&txn, input.vaccine_id)
        .await?
        .ok_or_else(|| Error::not_found("Vaccine", input.vaccine_id))?;

    let used = doses::count_vaccinations(&txn, existing.id).await?;
    if used > 0 && vaccine.id != existing.vaccine_id {
        return Err(Rejection::VaccineLocked { vaccinations: used }.into());
    }
    if u64::try_from(input.total_doses).unwrap_or(0) < used {
        return Err(Error::validation(format!(
            "Total doses cannot be lower than the {used} dose(s) already given"
        )));
    }

    let mut drive: drive::ActiveModel = existing.into();
    drive.name = Set(name);
    drive.date = Set(input.date);
    drive.vaccine_id = Set(vaccine.id);
    drive.total_doses = Set(input.total_doses);
    drive.enabled = Set(input.enabled);
    drive.applicable_classes = Set(join_classes(&input.applicable_classes));
    drive.updated_at = Set(chrono::Utc::now());
    let drive = drive.update(&txn).await?;

    txn.commit().await?;

    Ok(DriveWithDoses {
        available_doses: doses::available_doses(drive.total_doses, used),
        drive,
        vaccine_name: vaccine.name,
    })
}

/// Finds a drive by id.
pub async fn get_drive_by_id(
    db: &DatabaseConnection,
    drive_id: i64,
) -> Result<Option<drive::Model>> {
    Drive::find_by_id(drive_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a drive and attaches its vaccine name and remaining doses.
///
/// # Errors
/// Returns [`Error::NotFound`] when the drive does not exist.
pub async fn get_drive_with_doses(
    db: &DatabaseConnection,
    drive_id: i64,
) -> Result<DriveWithDoses> {
    let drive = get_drive_by_id(db, drive_id)
        .await?
        .ok_or_else(|| Error::not_found("Drive", drive_id))?;
    with_doses(db, drive).await
}

/// Lists every drive, earliest first, with remaining doses.
pub async fn get_all_drives_with_doses(db: &DatabaseConnection) -> Result<Vec<DriveWithDoses>> {
    let drives = Drive::find()
        .find_also_related(Vaccine)
        .order_by_asc(drive::Column::Date)
        .order_by_asc(drive::Column::Id)
        .all(db)
        .await?;

    let mut listed = Vec::with_capacity(drives.len());
    for (drive, vaccine) in drives {
        let available_doses = doses::available_doses_for_drive(db, &drive).await?;
        listed.push(DriveWithDoses {
            drive,
            vaccine_name: vaccine.map_or_else(|| "Unknown".to_string(), |v| v.name),
            available_doses,
        });
    }
    Ok(listed)
}

/// Deletes a drive together with the vaccinations recorded at it.
///
/// Returns the number of vaccinations removed.
///
/// # Errors
/// Returns [`Error::NotFound`] when the drive does not exist.
#[instrument(skip(db))]
pub async fn delete_drive(db: &DatabaseConnection, drive_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    let drive = Drive::find_by_id(drive_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Drive", drive_id))?;

    let removed = Vaccination::delete_many()
        .filter(vaccination::Column::DriveId.eq(drive.id))
        .exec(&txn)
        .await?
        .rows_affected;
    Drive::delete_by_id(drive.id).exec(&txn).await?;

    txn.commit().await?;
    info!("Deleted drive {} and {} vaccination(s)", drive.name, removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Days;

    #[test]
    fn test_parse_classes() {
        assert_eq!(
            parse_classes(" 6, 5 ,,6").unwrap(),
            vec![StudentClass::Five, StudentClass::Six]
        );
        assert!(parse_classes("").unwrap().is_empty());
        assert!(matches!(
            parse_classes("5,9"),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_join_classes() {
        assert_eq!(
            join_classes(&[StudentClass::Seven, StudentClass::Five, StudentClass::Seven]),
            "5,7"
        );
        assert_eq!(join_classes(&[]), "");
    }

    #[tokio::test]
    async fn test_create_drive_reports_full_capacity() -> Result<()> {
        let db = setup_test_db().await?;
        let vaccine = create_test_vaccine(&db, "MMR").await?;
        let today = test_today();

        let created = create_drive(
            &db,
            drive_input(vaccine.id, 40, days_after(today, 15)),
            today,
        )
        .await?;
        assert_eq!(created.available_doses, 40);
        assert_eq!(created.vaccine_name, "MMR");
        assert_eq!(created.drive.applicable_classes, "5,6");
        assert!(created.drive.enabled);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_drive_rejects_short_lead_time() -> Result<()> {
        let db = setup_test_db().await?;
        let vaccine = create_test_vaccine(&db, "MMR").await?;
        let today = test_today();

        let result = create_drive(
            &db,
            drive_input(vaccine.id, 40, days_after(today, 14)),
            today,
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Rejected(Rejection::DateTooSoon { .. }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_drive_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let vaccine = create_test_vaccine(&db, "MMR").await?;
        let today = test_today();

        let mut input = drive_input(vaccine.id, 10, days_after(today, 20));
        input.name = "  ".to_string();
        let result = create_drive(&db, input, today).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let input = drive_input(vaccine.id, -1, days_after(today, 20));
        let result = create_drive(&db, input, today).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let input = drive_input(999, 10, days_after(today, 20));
        let result = create_drive(&db, input, today).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_drive_revalidates_against_edit_day() -> Result<()> {
        let (db, vaccine, drive) = setup_with_drive(10).await?;

        // Ten days later the same date is inside the lead time.
        let later = test_today().checked_add_days(Days::new(10)).unwrap();
        let result = update_drive(
            &db,
            drive.id,
            drive_input(vaccine.id, 10, drive.date),
            later,
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Rejected(Rejection::DateTooSoon { .. }))
        ));

        let moved = update_drive(
            &db,
            drive.id,
            drive_input(vaccine.id, 12, days_after(later, 15)),
            later,
        )
        .await?;
        assert_eq!(moved.drive.date, days_after(later, 15));
        assert_eq!(moved.available_doses, 12);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_drive_cannot_shrink_below_used_doses() -> Result<()> {
        let (db, vaccine, drive) = setup_with_drive(3).await?;
        for code in ["S001", "S002"] {
            let student = create_test_student(&db, code).await?;
            crate::core::vaccination::record_vaccination(&db, student.id, drive.id).await?;
        }

        let today = test_today();
        let result = update_drive(&db, drive.id, drive_input(vaccine.id, 1, drive.date), today).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let updated =
            update_drive(&db, drive.id, drive_input(vaccine.id, 2, drive.date), today).await?;
        assert_eq!(updated.available_doses, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_drive_keeps_vaccine_once_used() -> Result<()> {
        use crate::core::vaccination::{VaccinationFilter, list_vaccinations, record_vaccination};

        let (db, mmr, mmr_drive) = setup_with_drive(5).await?;
        let polio = create_test_vaccine(&db, "Polio").await?;
        let today = test_today();
        let polio_drive = create_drive(&db, drive_input(polio.id, 5, days_after(today, 25)), today)
            .await?
            .drive;
        let student = create_test_student(&db, "S001").await?;
        record_vaccination(&db, student.id, mmr_drive.id).await?;
        record_vaccination(&db, student.id, polio_drive.id).await?;

        // Switching the polio drive to MMR would give S001 two MMR vaccinations.
        let result = update_drive(
            &db,
            polio_drive.id,
            drive_input(mmr.id, 5, polio_drive.date),
            today,
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::Rejected(Rejection::VaccineLocked { vaccinations: 1 }))
        ));
        let mmr_records = list_vaccinations(&db, VaccinationFilter::Vaccine(mmr.id)).await?;
        assert_eq!(mmr_records.len(), 1);

        // Other edits to a used drive still go through.
        let renamed = update_drive(
            &db,
            polio_drive.id,
            drive_input(polio.id, 8, polio_drive.date),
            today,
        )
        .await?;
        assert_eq!(renamed.available_doses, 7);

        // A drive with no vaccinations may switch vaccines freely.
        let unused = create_drive(&db, drive_input(polio.id, 5, days_after(today, 30)), today)
            .await?
            .drive;
        let switched =
            update_drive(&db, unused.id, drive_input(mmr.id, 5, unused.date), today).await?;
        assert_eq!(switched.vaccine_name, "MMR");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_drives_with_doses_sorted_by_date() -> Result<()> {
        let db = setup_test_db().await?;
        let vaccine = create_test_vaccine(&db, "MMR").await?;
        let today = test_today();

        let late = create_drive(&db, drive_input(vaccine.id, 5, days_after(today, 40)), today)
            .await?;
        let early = create_drive(&db, drive_input(vaccine.id, 5, days_after(today, 20)), today)
            .await?;
        let student = create_test_student(&db, "S001").await?;
        crate::core::vaccination::record_vaccination(&db, student.id, late.drive.id).await?;

        let drives = get_all_drives_with_doses(&db).await?;
        assert_eq!(drives.len(), 2);
        assert_eq!(drives[0].drive.id, early.drive.id);
        assert_eq!(drives[1].drive.id, late.drive.id);
        assert_eq!(drives[1].available_doses, 4);

        let single = get_drive_with_doses(&db, late.drive.id).await?;
        assert_eq!(single.available_doses, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_drive() -> Result<()> {
        let (db, _vaccine, drive) = setup_with_drive(3).await?;
        let student = create_test_student(&db, "S001").await?;
        crate::core::vaccination::record_vaccination(&db, student.id, drive.id).await?;

        assert_eq!(delete_drive(&db, drive.id).await?, 1);
        assert!(get_drive_by_id(&db, drive.id).await?.is_none());
        assert!(matches!(
            delete_drive(&db, drive.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }
}
