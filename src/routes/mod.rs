use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_session::Session;
use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use chrono::Local;
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::visit::{
    LAST_VISIT_COOKIE, LAST_VISIT_SESSION_KEY, SessionVisits, VISITS_SESSION_KEY,
};
use crate::forms::FieldErrors;
use crate::services::visits::track_visit;

pub mod auth;
pub mod categories;
pub mod main;
pub mod pages;

/// Signed-in account, taken from the identity cookie.
///
/// Extraction fails with a redirect to `/login`, so handlers that take this
/// type are login-only. Use `Option<AuthenticatedUser>` for pages open to
/// everyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .get_identity()
            .ok()
            .and_then(|identity| identity.id().ok())
            .map(|username| AuthenticatedUser { username });

        ready(user.ok_or_else(|| {
            InternalError::from_response("login required", redirect("/login")).into()
        }))
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok().body(tera.render(template, context).unwrap_or_else(|e| {
        log::error!("Failed to render template '{template}': {e}");
        String::new()
    }))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &user);
    context.insert("current_page", current_page);
    context
}

/// Context for a form page: the submitted values and their errors.
pub fn form_context<F: Serialize>(
    mut context: Context,
    form: &F,
    errors: &FieldErrors,
) -> Context {
    context.insert("form", form);
    context.insert("errors", errors);
    context
}

/// Count the visit for this request.
///
/// Reads the counter from the session and the `last_visit` cookie, writes the
/// reconciled state back into the session and returns the visit count with
/// the cookie to send.
pub fn track_visits(request: &HttpRequest, session: &Session) -> (u32, Cookie<'static>) {
    let state = SessionVisits {
        visits: session.get::<u32>(VISITS_SESSION_KEY).unwrap_or_else(|e| {
            log::warn!("Ignoring session visit count: {e}");
            None
        }),
        last_visit: session
            .get::<String>(LAST_VISIT_SESSION_KEY)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring session last visit: {e}");
                None
            }),
    };
    let incoming = request.cookie(LAST_VISIT_COOKIE);

    let update = track_visit(
        &state,
        incoming.as_ref().map(|cookie| cookie.value()),
        Local::now().naive_local(),
    );

    if let Err(e) = session.insert(VISITS_SESSION_KEY, update.visits) {
        log::error!("Failed to store visit count: {e}");
    }
    if let Err(e) = session.insert(LAST_VISIT_SESSION_KEY, &update.last_visit) {
        log::error!("Failed to store last visit: {e}");
    }

    let cookie = Cookie::build(LAST_VISIT_COOKIE, update.cookie)
        .path("/")
        .finish();
    (update.visits, cookie)
}

/// Attach `cookie` to an already built response.
pub fn with_cookie(mut response: HttpResponse, cookie: &Cookie<'_>) -> HttpResponse {
    if let Err(e) = response.add_cookie(cookie) {
        log::error!("Failed to set cookie '{}': {e}", cookie.name());
    }
    response
}
