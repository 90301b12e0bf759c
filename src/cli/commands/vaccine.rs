//! Vaccine commands - catalog maintenance.

use crate::{
    cli::{PortalContext, print_json},
    core::{session::Session, vaccine},
    errors::Result,
};
use clap::Subcommand;
use serde_json::json;
use tracing::info;

/// Vaccine subcommands.
#[derive(Subcommand, Debug)]
pub enum VaccineCommand {
    /// Add a vaccine to the catalog
    Add {
        /// Vaccine name
        #[arg(long)]
        name: String,
        /// Description
        #[arg(long)]
        description: String,
    },
    /// List the catalog
    List,
    /// Rename or re-describe a vaccine
    Edit {
        /// Vaccine id
        id: i64,
        /// New name
        #[arg(long)]
        name: String,
        /// New description
        #[arg(long)]
        description: String,
    },
    /// Delete a vaccine no drive uses
    Delete {
        /// Vaccine id
        id: i64,
    },
}

/// Runs a vaccine subcommand.
pub async fn handle(ctx: &PortalContext, session: &Session, command: VaccineCommand) -> Result<()> {
    let db = &ctx.database;
    match command {
        VaccineCommand::Add { name, description } => {
            print_json(&vaccine::create_vaccine(db, &name, &description).await?)
        }
        VaccineCommand::List => print_json(&vaccine::get_all_vaccines(db).await?),
        VaccineCommand::Edit {
            id,
            name,
            description,
        } => print_json(&vaccine::update_vaccine(db, id, &name, &description).await?),
        VaccineCommand::Delete { id } => {
            vaccine::delete_vaccine(db, id).await?;
            info!(coordinator = session.coordinator(), "Deleted vaccine {}", id);
            print_json(&json!({ "message": "Vaccine deleted" }))
        }
    }
}
