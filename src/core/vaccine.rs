//! Vaccine business logic - catalog maintenance.
//!
//! Vaccines referenced by a drive cannot be deleted; delete the drives first.

use crate::{
    config::catalog::VaccineSeed,
    entities::{Drive, Vaccine, drive, vaccine},
    errors::{Error, Rejection, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Retrieves the whole catalog ordered by name.
pub async fn get_all_vaccines(db: &DatabaseConnection) -> Result<Vec<vaccine::Model>> {
    Vaccine::find()
        .order_by_asc(vaccine::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a vaccine by id.
pub async fn get_vaccine_by_id<C>(db: &C, vaccine_id: i64) -> Result<Option<vaccine::Model>>
where
    C: ConnectionTrait,
{
    Vaccine::find_by_id(vaccine_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a vaccine by exact name.
pub async fn get_vaccine_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<vaccine::Model>> {
    Vaccine::find()
        .filter(vaccine::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

fn validate(name: &str, description: &str) -> Result<(String, String)> {
    let name = name.trim();
    let description = description.trim();
    if name.is_empty() || description.is_empty() {
        return Err(Error::validation("Vaccine name and description are required"));
    }
    Ok((name.to_string(), description.to_string()))
}

/// Adds a vaccine to the catalog.
///
/// # Errors
/// Returns [`Error::Validation`] when the name or description is blank.
#[instrument(skip(db))]
pub async fn create_vaccine(
    db: &DatabaseConnection,
    name: &str,
    description: &str,
) -> Result<vaccine::Model> {
    let (name, description) = validate(name, description)?;
    let now = chrono::Utc::now();

    let vaccine = vaccine::ActiveModel {
        name: Set(name),
        description: Set(description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = vaccine.insert(db).await?;
    info!("Created vaccine {} ({})", created.name, created.id);
    Ok(created)
}

/// Renames or re-describes a vaccine.
///
/// # Errors
/// - [`Error::Validation`] when the name or description is blank
/// - [`Error::NotFound`] when the vaccine does not exist
#[instrument(skip(db))]
pub async fn update_vaccine(
    db: &DatabaseConnection,
    vaccine_id: i64,
    name: &str,
    description: &str,
) -> Result<vaccine::Model> {
    let (name, description) = validate(name, description)?;

    let mut vaccine: vaccine::ActiveModel = get_vaccine_by_id(db, vaccine_id)
        .await?
        .ok_or_else(|| Error::not_found("Vaccine", vaccine_id))?
        .into();

    vaccine.name = Set(name);
    vaccine.description = Set(description);
    vaccine.updated_at = Set(chrono::Utc::now());

    vaccine.update(db).await.map_err(Into::into)
}

/// Deletes a vaccine that no drive references.
///
/// # Errors
/// - [`Error::NotFound`] when the vaccine does not exist
/// - [`Rejection::VaccineInUse`] when drives still reference it
#[instrument(skip(db))]
pub async fn delete_vaccine(db: &DatabaseConnection, vaccine_id: i64) -> Result<()> {
    let vaccine = get_vaccine_by_id(db, vaccine_id)
        .await?
        .ok_or_else(|| Error::not_found("Vaccine", vaccine_id))?;

    let drives = Drive::find()
        .filter(drive::Column::VaccineId.eq(vaccine.id))
        .count(db)
        .await?;
    if drives > 0 {
        return Err(Rejection::VaccineInUse { drives }.into());
    }

    Vaccine::delete_by_id(vaccine.id).exec(db).await?;
    info!("Deleted vaccine {}", vaccine.name);
    Ok(())
}

/// Inserts configured vaccines whose names are not in the catalog yet.
///
/// Returns how many were added.
pub async fn seed_vaccines(db: &DatabaseConnection, seeds: &[VaccineSeed]) -> Result<usize> {
    let mut added = 0;
    for seed in seeds {
        if get_vaccine_by_name(db, &seed.name).await?.is_some() {
            continue;
        }
        create_vaccine(db, &seed.name, &seed.description).await?;
        added += 1;
    }
    Ok(added)
}
