//! Dashboard aggregation.
//!
//! Counts students, lists enabled drives in the upcoming window with their
//! remaining doses, and computes per-vaccine coverage for the chart.

use crate::{
    core::{doses, schedule, snapshot::Snapshot},
    entities::student::StudentClass,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Number of students on the roster
    pub total_students: u64,
    /// Students with at least one vaccination
    pub vaccinated_students: u64,
    /// Enabled drives in the upcoming window, earliest first
    pub upcoming_drives: Vec<UpcomingDrive>,
    /// Coverage per catalog vaccine
    pub chart_data: Vec<VaccineCoverage>,
}

/// An enabled drive in the upcoming window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingDrive {
    /// Drive id
    pub drive_id: i64,
    /// Drive name
    pub name: String,
    /// Drive date
    pub date: NaiveDate,
    /// Name of the vaccine, or "Unknown"
    pub vaccine_name: String,
    /// Dose capacity
    pub total_doses: i32,
    /// Doses still available
    pub available_doses: u64,
    /// Eligible classes
    pub applicable_classes: Vec<StudentClass>,
}

/// Coverage of one vaccine across the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaccineCoverage {
    /// Vaccine id
    pub vaccine_id: i64,
    /// Vaccine name
    pub vaccine_name: String,
    /// Students with at least one vaccination for this vaccine
    pub vaccinated_count: u64,
    /// Students without one
    pub unvaccinated_count: u64,
    /// `vaccinated_count` as a whole percentage of all students
    pub percentage: u32,
}

impl VaccineCoverage {
    /// Chart label, e.g. `"MMR (40%)"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({}%)", self.vaccine_name, self.percentage)
    }
}

/// Rounded percentage of `part` in `total`; zero when `total` is zero.
#[must_use]
pub fn coverage_percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    // Cast safety: the ratio is in [0, 100] for part <= total.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let percentage = ((part as f64 / total as f64) * 100.0).round() as u32;
    percentage
}

/// Computes the dashboard from a snapshot as of `today`.
#[must_use]
pub fn build_dashboard(snapshot: &Snapshot, today: NaiveDate) -> Dashboard {
    let total_students = snapshot.students.len() as u64;
    let by_student = snapshot.vaccinations_by_student();
    let vaccinated_students = snapshot
        .students
        .iter()
        .filter(|s| by_student.contains_key(&s.id))
        .count() as u64;

    let vaccine_names: HashMap<i64, &str> = snapshot
        .vaccines
        .iter()
        .map(|v| (v.id, v.name.as_str()))
        .collect();
    let used = snapshot.doses_used_by_drive();

    let mut seen = HashSet::new();
    let mut upcoming_drives: Vec<UpcomingDrive> = snapshot
        .drives
        .iter()
        .filter(|d| d.enabled && schedule::is_upcoming(d.date, today))
        .filter(|d| seen.insert(d.id))
        .map(|d| UpcomingDrive {
            drive_id: d.id,
            name: d.name.clone(),
            date: d.date,
            vaccine_name: vaccine_names
                .get(&d.vaccine_id)
                .map_or_else(|| "Unknown".to_string(), |name| (*name).to_string()),
            total_doses: d.total_doses,
            available_doses: doses::available_doses(
                d.total_doses,
                used.get(&d.id).copied().unwrap_or(0),
            ),
            applicable_classes: d.classes(),
        })
        .collect();
    upcoming_drives.sort_by_key(|d| (d.date, d.drive_id));

    let drives = snapshot.drives_by_id();
    let chart_data = snapshot
        .vaccines
        .iter()
        .map(|vaccine| {
            let vaccinated_count = snapshot
                .students
                .iter()
                .filter(|student| {
                    by_student.get(&student.id).is_some_and(|records| {
                        records.iter().any(|record| {
                            drives
                                .get(&record.drive_id)
                                .is_some_and(|d| d.vaccine_id == vaccine.id)
                        })
                    })
                })
                .count() as u64;
            VaccineCoverage {
                vaccine_id: vaccine.id,
                vaccine_name: vaccine.name.clone(),
                vaccinated_count,
                unvaccinated_count: total_students.saturating_sub(vaccinated_count),
                percentage: coverage_percentage(vaccinated_count, total_students),
            }
        })
        .collect();

    Dashboard {
        total_students,
        vaccinated_students,
        upcoming_drives,
        chart_data,
    }
}

/// Loads a fresh snapshot and builds the dashboard.
#[instrument(skip(db))]
pub async fn generate_dashboard(db: &DatabaseConnection, today: NaiveDate) -> Result<Dashboard> {
    let snapshot = Snapshot::load(db).await?;
    Ok(build_dashboard(&snapshot, today))
}
