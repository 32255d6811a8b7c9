//! Visit-counter state carried by the session and the `last_visit` cookie.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session key holding the number of distinct days visited.
pub const VISITS_SESSION_KEY: &str = "visits";
/// Session key holding the full-precision last visit timestamp.
pub const LAST_VISIT_SESSION_KEY: &str = "last_visit";
/// Name of the cookie shadowing the last visit timestamp.
pub const LAST_VISIT_COOKIE: &str = "last_visit";

/// Cookie timestamp format, microseconds truncated.
pub const COOKIE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Session timestamp format, microsecond precision.
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Visit state as read from the server-side session. Both fields are absent
/// on a client's first request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionVisits {
    pub visits: Option<u32>,
    pub last_visit: Option<String>,
}

/// Result of reconciling session and cookie state for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitUpdate {
    /// Visit count to store back into the session.
    pub visits: u32,
    /// Last visit to store back into the session (full precision).
    pub last_visit: String,
    /// Value for the outgoing `last_visit` cookie.
    pub cookie: String,
    /// Whether a new calendar day was counted.
    pub counted: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VisitError {
    #[error("malformed last visit timestamp: {0:?}")]
    MalformedTimestamp(String),
}
