//! Coordinator credentials loaded from environment variables.
//!
//! The portal has a single coordinator account. Its email and password come from
//! `COORDINATOR_EMAIL` and `COORDINATOR_PASSWORD` (usually via `.env`).

use crate::errors::{Error, Result};

/// Credentials a login attempt is checked against.
#[derive(Clone)]
pub struct CoordinatorCredentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl std::fmt::Debug for CoordinatorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads the coordinator credentials from the environment.
///
/// # Errors
/// Returns a configuration error when either variable is missing or empty.
pub fn load_credentials() -> Result<CoordinatorCredentials> {
    let email = read_var("COORDINATOR_EMAIL")?;
    let password = read_var("COORDINATOR_PASSWORD")?;
    Ok(CoordinatorCredentials { email, password })
}

fn read_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("{name} is not set"),
        }),
    }
}
