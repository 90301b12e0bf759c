//! Dose accounting for drives.
//!
//! Remaining capacity is always derived from the vaccination count at read time
//! and never stored, so deletions free a dose immediately.

use crate::{
    entities::{Vaccination, drive, vaccination},
    errors::Result,
};
use sea_orm::{PaginatorTrait, prelude::*};

/// Remaining doses given a capacity and the number already administered.
///
/// Never negative: a drive whose capacity was exceeded reports zero.
#[must_use]
pub fn available_doses(total_doses: i32, used: u64) -> u64 {
    u64::try_from(total_doses).unwrap_or(0).saturating_sub(used)
}

/// Counts the vaccinations recorded against a drive.
pub async fn count_vaccinations<C>(db: &C, drive_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    Vaccination::find()
        .filter(vaccination::Column::DriveId.eq(drive_id))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Remaining doses for a stored drive, recounted on every call.
pub async fn available_doses_for_drive<C>(db: &C, drive: &drive::Model) -> Result<u64>
where
    C: ConnectionTrait,
{
    let used = count_vaccinations(db, drive.id).await?;
    Ok(available_doses(drive.total_doses, used))
}
