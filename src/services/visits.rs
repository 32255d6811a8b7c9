//! Day-granular visit counting.
//!
//! The session holds the authoritative `visits` counter and a full-precision
//! `last_visit`; the `last_visit` cookie shadows the latter so the counter can
//! pick up again when the session is lost. A new visit is counted only once a
//! full day has passed since the recorded last visit.

use chrono::NaiveDateTime;

use crate::domain::visit::{
    COOKIE_TIMESTAMP_FORMAT, SESSION_TIMESTAMP_FORMAT, SessionVisits, VisitError, VisitUpdate,
};

/// Parse a `last_visit` value as written to the cookie or the session.
///
/// Fractional seconds are optional, so both formats are accepted.
pub fn parse_last_visit(value: &str) -> Result<NaiveDateTime, VisitError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|_| VisitError::MalformedTimestamp(value.to_string()))
}

pub fn format_cookie_timestamp(value: NaiveDateTime) -> String {
    value.format(COOKIE_TIMESTAMP_FORMAT).to_string()
}

pub fn format_session_timestamp(value: NaiveDateTime) -> String {
    value.format(SESSION_TIMESTAMP_FORMAT).to_string()
}

/// Reconcile session and cookie state for a request made at `now`.
///
/// The visit count defaults to 1 and the cookie to `now`. The reference point
/// is the session's last visit when present, otherwise the cookie. If at least
/// one full day has elapsed, the count grows by one and the cookie moves to
/// `now`; otherwise the incoming cookie is echoed back unchanged.
pub fn reconcile_visits(
    session: &SessionVisits,
    cookie: Option<&str>,
    now: NaiveDateTime,
) -> Result<VisitUpdate, VisitError> {
    let session_last_visit = session
        .last_visit
        .as_deref()
        .map(parse_last_visit)
        .transpose()?;
    let cookie = cookie
        .map(|value| parse_last_visit(value).map(|parsed| (value.to_string(), parsed)))
        .transpose()?;

    Ok(apply_day_boundary(
        session.visits,
        session_last_visit,
        cookie,
        now,
    ))
}

/// Same as [`reconcile_visits`], but a malformed timestamp is logged and
/// treated as absent instead of failing the request. The visit count is kept.
pub fn track_visit(session: &SessionVisits, cookie: Option<&str>, now: NaiveDateTime) -> VisitUpdate {
    let session_last_visit = session.last_visit.as_deref().and_then(|value| {
        parse_last_visit(value)
            .inspect_err(|e| log::warn!("Ignoring session visit state: {e}"))
            .ok()
    });
    let cookie = cookie.and_then(|value| {
        parse_last_visit(value)
            .inspect_err(|e| log::warn!("Ignoring visit cookie: {e}"))
            .ok()
            .map(|parsed| (value.to_string(), parsed))
    });

    apply_day_boundary(session.visits, session_last_visit, cookie, now)
}

fn apply_day_boundary(
    visits: Option<u32>,
    session_last_visit: Option<NaiveDateTime>,
    cookie: Option<(String, NaiveDateTime)>,
    now: NaiveDateTime,
) -> VisitUpdate {
    let visits = visits.unwrap_or(1);
    let (cookie_value, cookie_time) =
        cookie.unwrap_or_else(|| (format_cookie_timestamp(now), now));
    let last_visit = session_last_visit.unwrap_or(cookie_time);

    if (now - last_visit).num_days() > 0 {
        VisitUpdate {
            visits: visits.saturating_add(1),
            last_visit: format_session_timestamp(now),
            cookie: format_cookie_timestamp(now),
            counted: true,
        }
    } else {
        VisitUpdate {
            visits,
            last_visit: format_session_timestamp(last_visit),
            cookie: cookie_value,
            counted: false,
        }
    }
}
