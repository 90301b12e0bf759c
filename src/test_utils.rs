//! Shared test utilities for the vaccination portal.
//!
//! Helpers for setting up an in-memory database and creating catalog records
//! with sensible defaults.

use crate::{
    core::{drive, student, vaccine},
    entities::{self, student::StudentClass},
    errors::Result,
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::{ConnectOptions, DatabaseConnection};

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool holds a single connection so every query sees the same database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed reference day used as "today" in tests.
#[allow(clippy::unwrap_used)]
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

/// `days` after `date`.
#[allow(clippy::unwrap_used)]
pub fn days_after(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap()
}

/// Drive input with defaults: named "Drive <date>", enabled, classes 5 and 6.
pub fn drive_input(vaccine_id: i64, total_doses: i32, date: NaiveDate) -> drive::DriveInput {
    drive::DriveInput {
        name: format!("Drive {date}"),
        date,
        vaccine_id,
        total_doses,
        enabled: true,
        applicable_classes: vec![StudentClass::Five, StudentClass::Six],
    }
}

/// Creates a vaccine with a generic description.
pub async fn create_test_vaccine(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::vaccine::Model> {
    vaccine::create_vaccine(db, name, &format!("{name} vaccine")).await
}

/// Creates a class 5 student named after their code.
pub async fn create_test_student(
    db: &DatabaseConnection,
    code: &str,
) -> Result<entities::student::Model> {
    create_custom_student(db, code, StudentClass::Five).await
}

/// Creates a student of the given class named after their code.
pub async fn create_custom_student(
    db: &DatabaseConnection,
    code: &str,
    class: StudentClass,
) -> Result<entities::student::Model> {
    student::create_student(db, code, &format!("Student {code}"), class).await
}

/// Sets up a database with an "MMR" vaccine and one enabled drive for classes
/// 5 and 6, twenty days after [`test_today`].
pub async fn setup_with_drive(
    total_doses: i32,
) -> Result<(
    DatabaseConnection,
    entities::vaccine::Model,
    entities::drive::Model,
)> {
    let db = setup_test_db().await?;
    let vaccine = create_test_vaccine(&db, "MMR").await?;
    let created = drive::create_drive(
        &db,
        drive_input(vaccine.id, total_doses, days_after(test_today(), 20)),
        test_today(),
    )
    .await?;
    Ok((db, vaccine, created.drive))
}

/// In-memory student model for snapshot tests.
pub fn test_student_model(id: i64, code: &str, class: StudentClass) -> entities::student::Model {
    entities::student::Model {
        id,
        code: code.to_string(),
        name: format!("Student {code}"),
        student_class: class,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// In-memory vaccine model for snapshot tests.
pub fn test_vaccine_model(id: i64, name: &str) -> entities::vaccine::Model {
    entities::vaccine::Model {
        id,
        name: name.to_string(),
        description: format!("{name} vaccine"),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// In-memory enabled drive model (classes 5 and 6, ten doses) for snapshot tests.
pub fn test_drive_model(
    id: i64,
    name: &str,
    vaccine_id: i64,
    date: NaiveDate,
) -> entities::drive::Model {
    entities::drive::Model {
        id,
        name: name.to_string(),
        date,
        vaccine_id,
        total_doses: 10,
        enabled: true,
        applicable_classes: "5,6".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// In-memory vaccination model for snapshot tests.
pub fn test_vaccination_model(
    id: i64,
    student_id: i64,
    drive_id: i64,
) -> entities::vaccination::Model {
    entities::vaccination::Model {
        id,
        student_id,
        drive_id,
        created_at: Utc::now(),
    }
}
