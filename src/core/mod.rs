//! Core business logic - framework-agnostic portal operations.
//!
//! Catalog maintenance (students, vaccines, drives), the vaccination rules, and
//! the read-only dashboard and report aggregations. Nothing here knows about the
//! command line; every function takes a database connection and returns
//! structured data or a typed error.

/// Aggregated dashboard view
pub mod dashboard;
/// Dose accounting for drives
pub mod doses;
/// Drive scheduling and maintenance
pub mod drive;
/// Vaccination admissibility rules
pub mod eligibility;
/// Per-student, per-vaccine report rows
pub mod report;
/// Drive date constraints
pub mod schedule;
/// Coordinator sessions
pub mod session;
/// Point-in-time copy of all four tables for aggregation
pub mod snapshot;
/// Student roster maintenance
pub mod student;
/// Recording and listing vaccinations
pub mod vaccination;
/// Vaccine catalog maintenance
pub mod vaccine;
