//! Student business logic - roster maintenance.
//!
//! Students are identified to users by their `code` (e.g. `S001`), which is unique
//! and never changes once created. Deleting a student also deletes their
//! vaccinations so no record points at a missing student.

use crate::{
    entities::{Student, Vaccination, student, student::StudentClass, vaccination},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, instrument};

/// One unvalidated roster row, as it arrives from a form or an import file.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    /// Real-world student ID
    #[serde(rename = "id", alias = "code")]
    pub code: String,
    /// Full name
    pub name: String,
    /// Class label, expected to be 5, 6 or 7
    #[serde(rename = "studentClass", alias = "student_class", alias = "class")]
    pub student_class: String,
}

/// Retrieves every student ordered by code.
pub async fn get_all_students(db: &DatabaseConnection) -> Result<Vec<student::Model>> {
    Student::find()
        .order_by_asc(student::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by surrogate id.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a student by their human-readable code.
pub async fn get_student_by_code<C>(db: &C, code: &str) -> Result<Option<student::Model>>
where
    C: ConnectionTrait,
{
    Student::find()
        .filter(student::Column::Code.eq(code.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

fn required(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation("All fields are required"));
    }
    Ok(value.to_string())
}

fn new_active_model(code: String, name: String, class: StudentClass) -> student::ActiveModel {
    let now = chrono::Utc::now();
    student::ActiveModel {
        code: Set(code),
        name: Set(name),
        student_class: Set(class),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// Adds a student to the roster.
///
/// # Errors
/// - [`Error::Validation`] when the code or name is blank or the code is taken
/// - [`Error::Database`] when the insert fails
#[instrument(skip(db))]
pub async fn create_student(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    class: StudentClass,
) -> Result<student::Model> {
    let code = required(code)?;
    let name = required(name)?;

    if get_student_by_code(db, &code).await?.is_some() {
        return Err(Error::validation(format!("Student ID {code} already exists")));
    }

    let created = new_active_model(code, name, class).insert(db).await?;
    info!("Created student {}", created.code);
    Ok(created)
}

/// Imports a batch of students. Either every row is inserted or none is.
///
/// Every row is validated before anything is written: codes and names must be
/// present, classes must be 5, 6 or 7, and codes must be unique both within the
/// batch and against the existing roster.
///
/// # Errors
/// Returns [`Error::Validation`] naming the first offending row.
#[instrument(skip(db, rows), fields(rows = rows.len()))]
pub async fn import_students(db: &DatabaseConnection, rows: Vec<NewStudent>) -> Result<u64> {
    if rows.is_empty() {
        return Err(Error::validation("Invalid student data"));
    }

    let mut seen = HashSet::new();
    let mut models = Vec::with_capacity(rows.len());
    for row in rows {
        let code = required(&row.code)
            .map_err(|_| Error::validation("All fields are required for each student"))?;
        let name = required(&row.name)
            .map_err(|_| Error::validation("All fields are required for each student"))?;
        let class: StudentClass = row.student_class.parse().map_err(|_| {
            Error::validation(format!(
                "Invalid class for student {code}: class must be 5, 6, or 7"
            ))
        })?;
        if !seen.insert(code.clone()) {
            return Err(Error::validation(format!(
                "Student ID {code} appears more than once"
            )));
        }
        models.push((code, name, class));
    }

    let txn = db.begin().await?;

    let clashes = Student::find()
        .filter(student::Column::Code.is_in(seen.iter().cloned()))
        .order_by_asc(student::Column::Code)
        .all(&txn)
        .await?;
    if let Some(existing) = clashes.first() {
        return Err(Error::validation(format!(
            "Student ID {} already exists",
            existing.code
        )));
    }

    let count = models.len() as u64;
    Student::insert_many(
        models
            .into_iter()
            .map(|(code, name, class)| new_active_model(code, name, class)),
    )
    .exec(&txn)
    .await?;

    txn.commit().await?;
    info!("Imported {} students", count);
    Ok(count)
}

/// Updates a student's name and class. The code is immutable.
///
/// # Errors
/// - [`Error::Validation`] when the name is blank
/// - [`Error::NotFound`] when the student does not exist
#[instrument(skip(db))]
pub async fn update_student(
    db: &DatabaseConnection,
    student_id: i64,
    name: &str,
    class: StudentClass,
) -> Result<student::Model> {
    let name = required(name)?;

    let mut student: student::ActiveModel = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?
        .into();

    student.name = Set(name);
    student.student_class = Set(class);
    student.updated_at = Set(chrono::Utc::now());

    student.update(db).await.map_err(Into::into)
}

/// Deletes a student together with their vaccinations.
///
/// Returns the number of vaccinations removed.
///
/// # Errors
/// Returns [`Error::NotFound`] when the student does not exist.
#[instrument(skip(db))]
pub async fn delete_student(db: &DatabaseConnection, student_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    let student = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Student", student_id))?;

    let removed = Vaccination::delete_many()
        .filter(vaccination::Column::StudentId.eq(student.id))
        .exec(&txn)
        .await?
        .rows_affected;
    Student::delete_by_id(student.id).exec(&txn).await?;

    txn.commit().await?;
    info!(
        "Deleted student {} and {} vaccination(s)",
        student.code, removed
    );
    Ok(removed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn row(code: &str, name: &str, class: &str) -> NewStudent {
        NewStudent {
            code: code.to_string(),
            name: name.to_string(),
            student_class: class.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_student_trims_and_stores() -> Result<()> {
        let db = setup_test_db().await?;

        let student = create_student(&db, " S001 ", " Asha Rao ", StudentClass::Six).await?;
        assert_eq!(student.code, "S001");
        assert_eq!(student.name, "Asha Rao");
        assert_eq!(student.student_class, StudentClass::Six);

        let found = get_student_by_code(&db, "S001").await?.unwrap();
        assert_eq!(found.id, student.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_student_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_student(&db, "", "Asha", StudentClass::Five).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_student(&db, "S001", "   ", StudentClass::Five).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        create_student(&db, "S001", "Asha", StudentClass::Five).await?;
        let duplicate = create_student(&db, "S001", "Ben", StudentClass::Six).await;
        assert!(matches!(duplicate, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_students_inserts_all_rows() -> Result<()> {
        let db = setup_test_db().await?;

        let imported = import_students(
            &db,
            vec![
                row("S002", "Ben", "6"),
                row("S001", "Asha", "5"),
                row("S003", "Chen", " 7 "),
            ],
        )
        .await?;
        assert_eq!(imported, 3);

        let students = get_all_students(&db).await?;
        let codes: Vec<_> = students.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, ["S001", "S002", "S003"]);
        assert_eq!(students[2].student_class, StudentClass::Seven);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_students_is_all_or_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let bad_class = import_students(
            &db,
            vec![row("S001", "Asha", "5"), row("S002", "Ben", "8")],
        )
        .await;
        let err = bad_class.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid class for student S002: class must be 5, 6, or 7"
        );
        assert!(get_all_students(&db).await?.is_empty());

        let repeated = import_students(
            &db,
            vec![row("S001", "Asha", "5"), row("S001", "Asha", "5")],
        )
        .await;
        assert!(matches!(repeated, Err(Error::Validation { .. })));

        create_test_student(&db, "S009").await?;
        let clash = import_students(
            &db,
            vec![row("S001", "Asha", "5"), row("S009", "Ida", "6")],
        )
        .await;
        assert_eq!(clash.unwrap_err().to_string(), "Student ID S009 already exists");
        assert_eq!(get_all_students(&db).await?.len(), 1);

        let empty = import_students(&db, Vec::new()).await;
        assert!(matches!(empty, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_student_keeps_code() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_student(&db, "S001").await?;

        let updated = update_student(&db, student.id, "Asha R.", StudentClass::Seven).await?;
        assert_eq!(updated.code, "S001");
        assert_eq!(updated.name, "Asha R.");
        assert_eq!(updated.student_class, StudentClass::Seven);

        let missing = update_student(&db, 999, "Nobody", StudentClass::Five).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_student_cascades_vaccinations() -> Result<()> {
        let (db, _vaccine, drive) = setup_with_drive(3).await?;
        let student = create_test_student(&db, "S001").await?;
        crate::core::vaccination::record_vaccination(&db, student.id, drive.id).await?;

        let removed = delete_student(&db, student.id).await?;
        assert_eq!(removed, 1);
        assert!(get_student_by_id(&db, student.id).await?.is_none());
        assert_eq!(crate::core::doses::count_vaccinations(&db, drive.id).await?, 0);

        let again = delete_student(&db, student.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }
}
