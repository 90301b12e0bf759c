//! Vaccination report generation.
//!
//! The report has one row for every (student, vaccine) pair in the catalog, so a
//! roster of N students and a catalog of M vaccines always yields N * M rows.
//! Vaccinated rows carry the earliest drive at which the student received that
//! vaccine.

use crate::{
    core::snapshot::Snapshot,
    entities::student::StudentClass,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::io::Write;
use tracing::{debug, instrument};

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Student code (e.g. "S001")
    pub student_code: String,
    /// Student name
    pub student_name: String,
    /// Student class
    pub student_class: StudentClass,
    /// Vaccine name
    pub vaccine_name: String,
    /// Whether the student holds a vaccination for this vaccine
    pub vaccinated: bool,
    /// Earliest drive where the vaccine was given
    pub drive_name: Option<String>,
    /// Date of that drive
    pub date: Option<NaiveDate>,
}

impl ReportRow {
    /// `"Yes"` or `"No"`.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        if self.vaccinated { "Yes" } else { "No" }
    }
}

/// Optional narrowing of the report.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Keep rows for this vaccine name (case-insensitive)
    pub vaccine: Option<String>,
    /// Keep rows with this status
    pub vaccinated: Option<bool>,
    /// Keep rows for this class
    pub student_class: Option<StudentClass>,
}

impl ReportFilter {
    /// Whether a row passes every set criterion.
    #[must_use]
    pub fn matches(&self, row: &ReportRow) -> bool {
        self.vaccine
            .as_deref()
            .is_none_or(|name| row.vaccine_name.eq_ignore_ascii_case(name.trim()))
            && self.vaccinated.is_none_or(|v| row.vaccinated == v)
            && self.student_class.is_none_or(|c| row.student_class == c)
    }

    /// Rows that pass the filter, order preserved.
    #[must_use]
    pub fn apply(&self, rows: Vec<ReportRow>) -> Vec<ReportRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Builds the report from a snapshot. Rows are sorted by student code; within a
/// student they follow catalog order.
#[must_use]
pub fn build_report(snapshot: &Snapshot) -> Vec<ReportRow> {
    let drives = snapshot.drives_by_id();
    let by_student = snapshot.vaccinations_by_student();

    let mut rows = Vec::with_capacity(snapshot.students.len() * snapshot.vaccines.len());
    for student in &snapshot.students {
        let records = by_student.get(&student.id);
        for vaccine in &snapshot.vaccines {
            let mut vaccinated = false;
            let mut earliest: Option<(NaiveDate, &str)> = None;

            let given = records
                .into_iter()
                .flatten()
                .filter_map(|record| drives.get(&record.drive_id))
                .filter(|drive| drive.vaccine_id == vaccine.id);
            for drive in given {
                vaccinated = true;
                // Strict comparison keeps the first drive seen on a date tie.
                if earliest.is_none_or(|(date, _)| drive.date < date) {
                    earliest = Some((drive.date, drive.name.as_str()));
                }
            }

            rows.push(ReportRow {
                student_code: student.code.clone(),
                student_name: student.name.clone(),
                student_class: student.student_class,
                vaccine_name: vaccine.name.clone(),
                vaccinated,
                drive_name: earliest.map(|(_, name)| name.to_string()),
                date: earliest.map(|(date, _)| date),
            });
        }
    }

    rows.sort_by(|a, b| a.student_code.cmp(&b.student_code));
    rows
}

/// Loads a fresh snapshot and builds the report.
#[instrument(skip(db))]
pub async fn generate_report(db: &DatabaseConnection) -> Result<Vec<ReportRow>> {
    let snapshot = Snapshot::load(db).await?;
    let rows = build_report(&snapshot);
    debug!("Report generated with {} rows", rows.len());
    Ok(rows)
}

/// Writes rows as CSV with a header line.
///
/// # Errors
/// Returns an error if writing to `writer` fails.
pub fn write_report_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Student ID",
        "Student Name",
        "Class",
        "Vaccine",
        "Vaccinated",
        "Drive",
        "Date",
    ])?;
    for row in rows {
        let date = row.date.map(|d| d.format("%Y-%m-%d").to_string());
        csv.write_record([
            row.student_code.as_str(),
            row.student_name.as_str(),
            row.student_class.label(),
            row.vaccine_name.as_str(),
            row.status(),
            row.drive_name.as_deref().unwrap_or(""),
            date.as_deref().unwrap_or(""),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{drive::create_drive, vaccination::record_vaccination};
    use crate::test_utils::*;

    fn snapshot_with_tie() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.students.push(test_student_model(1, "S001", StudentClass::Five));
        snapshot.vaccines.push(test_vaccine_model(1, "MMR"));
        let date = days_after(test_today(), 20);
        snapshot.drives.push(test_drive_model(1, "First", 1, date));
        snapshot.drives.push(test_drive_model(2, "Second", 1, date));
        snapshot.vaccinations.push(test_vaccination_model(1, 1, 1));
        snapshot.vaccinations.push(test_vaccination_model(2, 1, 2));
        snapshot
    }

    #[test]
    fn test_date_tie_keeps_first_drive() {
        let rows = build_report(&snapshot_with_tie());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].drive_name.as_deref(), Some("First"));
    }

    #[test]
    fn test_row_count_is_students_times_vaccines() {
        let mut snapshot = Snapshot::default();
        for (id, code) in [(1, "S003"), (2, "S001"), (3, "S002")] {
            snapshot
                .students
                .push(test_student_model(id, code, StudentClass::Six));
        }
        for (id, name) in [(1, "MMR"), (2, "Polio")] {
            snapshot.vaccines.push(test_vaccine_model(id, name));
        }

        let rows = build_report(&snapshot);
        assert_eq!(rows.len(), 6);
        assert!(rows.iter().all(|r| !r.vaccinated && r.date.is_none()));
        let codes: Vec<_> = rows.iter().map(|r| r.student_code.as_str()).collect();
        assert_eq!(codes, ["S001", "S001", "S002", "S002", "S003", "S003"]);
        assert_eq!(rows[0].vaccine_name, "MMR");
        assert_eq!(rows[1].vaccine_name, "Polio");

        assert!(build_report(&Snapshot::default()).is_empty());
    }

    #[test]
    fn test_report_filter() {
        let mut snapshot = snapshot_with_tie();
        snapshot.vaccines.push(test_vaccine_model(2, "Polio"));
        let rows = build_report(&snapshot);

        let vaccinated = ReportFilter {
            vaccinated: Some(true),
            ..Default::default()
        };
        let kept = vaccinated.apply(rows.clone());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].vaccine_name, "MMR");

        let polio = ReportFilter {
            vaccine: Some("polio".to_string()),
            ..Default::default()
        };
        assert_eq!(polio.apply(rows.clone()).len(), 1);

        let seventh = ReportFilter {
            student_class: Some(StudentClass::Seven),
            ..Default::default()
        };
        assert!(seventh.apply(rows).is_empty());
    }

    #[test]
    fn test_write_report_csv() {
        let rows = build_report(&snapshot_with_tie());
        let mut out = Vec::new();
        write_report_csv(&rows, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let date = days_after(test_today(), 20).format("%Y-%m-%d").to_string();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Student ID,Student Name,Class,Vaccine,Vaccinated,Drive,Date")
        );
        assert_eq!(
            lines.next().unwrap(),
            format!("S001,Student S001,5,MMR,Yes,First,{date}")
        );
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn test_generate_report_reports_earliest_drive() -> Result<()> {
        let (db, mmr, later) = setup_with_drive(5).await?;
        let today = test_today();
        create_test_vaccine(&db, "Polio").await?;
        let earlier = create_drive(&db, drive_input(mmr.id, 5, days_after(today, 16)), today)
            .await?
            .drive;

        let ben = create_test_student(&db, "S002").await?;
        create_test_student(&db, "S001").await?;
        record_vaccination(&db, ben.id, earlier.id).await?;

        let rows = generate_report(&db).await?;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].student_code, "S001");
        assert!(!rows[0].vaccinated);
        assert_eq!(rows[0].status(), "No");

        let ben_mmr = &rows[2];
        assert_eq!(ben_mmr.student_code, "S002");
        assert_eq!(ben_mmr.vaccine_name, "MMR");
        assert!(ben_mmr.vaccinated);
        assert_eq!(ben_mmr.drive_name.as_deref(), Some(earlier.name.as_str()));
        assert_eq!(ben_mmr.date, Some(earlier.date));
        assert_ne!(ben_mmr.date, Some(later.date));
        Ok(())
    }
}
