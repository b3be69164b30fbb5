//! Session error taxonomy.
//!
//! Only store mutation entry points produce observable errors. Resolver
//! functions stay total, malformed assignments are dropped at intake with a
//! warning, and stale shop references are filtered silently.

use thiserror::Error;

/// Error kinds recorded in the service error slot for the surrounding
/// application to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The external auth flow rejected a login or logout call. State was
    /// left exactly as it was before the call.
    AuthGatewayFailure(String),
}

/// Errors returned by session mutation entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A login/logout flow is already in flight; concurrent flows are
    /// rejected rather than queued.
    #[error("an auth flow is already in progress")]
    FlowInFlight,

    /// The operation requires an authenticated session.
    #[error("no session is active")]
    NotAuthenticated,

    /// The requested transition is not permitted for this session. State is
    /// left unchanged.
    #[error("permission denied: {denied}")]
    PermissionDenied { denied: &'static str },

    /// The external gateway failed; state was rolled back to its pre-call
    /// value.
    #[error("auth gateway failure: {0}")]
    Gateway(String),
}
