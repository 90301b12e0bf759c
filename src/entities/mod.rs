//! Entity module - SeaORM definitions for the portal tables.
//! Students, vaccines and drives form the catalog; vaccinations link a student
//! to the drive where the dose was given.

pub mod drive;
pub mod student;
pub mod vaccination;
pub mod vaccine;

// Re-export specific types to avoid conflicts
pub use drive::{Column as DriveColumn, Entity as Drive, Model as DriveModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use vaccination::{
    Column as VaccinationColumn, Entity as Vaccination, Model as VaccinationModel,
};
pub use vaccine::{Column as VaccineColumn, Entity as Vaccine, Model as VaccineModel};
