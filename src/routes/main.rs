use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::repository::DieselRepository;
use crate::routes::{
    AuthenticatedUser, base_context, redirect, render_template, track_visits, with_cookie,
};
use crate::services::ServiceError;
use crate::services::auth::show_profile;
use crate::services::main::{show_about as show_about_service, show_index as show_index_service};

#[get("/")]
pub async fn index(
    request: HttpRequest,
    session: Session,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (visits, cookie) = track_visits(&request, &session);

    match show_index_service(repo.get_ref()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, user.as_ref(), "index");
            context.insert("categories", &data.categories);
            context.insert("pages", &data.pages);
            context.insert("visits", &visits);
            with_cookie(
                render_template(&tera, "rango/index.html", &context),
                &cookie,
            )
        }
        Err(err) => {
            log::error!("Failed to render index page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/about")]
pub async fn about(
    request: HttpRequest,
    session: Session,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let (visits, cookie) = track_visits(&request, &session);

    match show_about_service(repo.get_ref()) {
        Ok(categories) => {
            let mut context = base_context(&flash_messages, user.as_ref(), "about");
            context.insert("categories", &categories);
            context.insert("visits", &visits);
            with_cookie(
                render_template(&tera, "rango/about.html", &context),
                &cookie,
            )
        }
        Err(err) => {
            log::error!("Failed to render about page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/restricted")]
pub async fn restricted(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_profile(&user.username, repo.get_ref()) {
        Ok(profile) => {
            let mut context = base_context(&flash_messages, Some(&user), "restricted");
            context.insert("profile", &profile);
            render_template(&tera, "rango/restricted.html", &context)
        }
        Err(ServiceError::NotFound) => {
            log::warn!("Identity '{}' has no account", user.username);
            redirect("/logout")
        }
        Err(err) => {
            log::error!("Failed to render restricted page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
