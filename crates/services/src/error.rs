//! Shared error types for the services crate.

use thiserror::Error;

use client::ClientError;

/// Fatal failures while starting a session.
///
/// Both variants abort the flow; the caller surfaces a notification and
/// returns the user to the dashboard.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StartError {
    #[error("test is not available: {0}")]
    TestUnavailable(#[source] ClientError),

    #[error("could not start an attempt: {0}")]
    AttemptCreation(#[source] ClientError),
}

/// Fatal failures during a running session.
///
/// Recoverable backend failures (answer submission, finish) never surface
/// here; they become user-visible notices and the session continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The backend invalidated the bearer token mid-session. The session
    /// state is abandoned; sign-in handling belongs to the caller.
    #[error("session expired, sign in again")]
    Expired,
}
