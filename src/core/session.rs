//! Coordinator sessions.
//!
//! A [`Session`] is obtained by logging in and is passed explicitly to every
//! request handler; nothing keeps a global "logged in" flag.

use crate::{
    config::coordinator::CoordinatorCredentials,
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Proof that a coordinator logged in.
#[derive(Debug, Clone)]
pub struct Session {
    coordinator: String,
    started_at: DateTime<Utc>,
}

impl Session {
    /// Email of the logged-in coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &str {
        &self.coordinator
    }

    /// When the session was opened.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Checks an email/password pair against the configured coordinator.
///
/// Emails compare case-insensitively, passwords exactly.
///
/// # Errors
/// Returns [`Error::Unauthorized`] when the pair does not match.
pub fn login(credentials: &CoordinatorCredentials, email: &str, password: &str) -> Result<Session> {
    let email = email.trim();
    if !email.eq_ignore_ascii_case(credentials.email.trim()) || password != credentials.password {
        warn!("Rejected login attempt for {}", email);
        return Err(Error::Unauthorized);
    }

    info!("Coordinator {} logged in", email);
    Ok(Session {
        coordinator: email.to_string(),
        started_at: Utc::now(),
    })
}
