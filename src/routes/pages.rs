use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::categories::CategoryDto;
use crate::forms::FieldErrors;
use crate::forms::pages::{AddPageForm, AddPageFormPayload};
use crate::repository::DieselRepository;
use crate::routes::{AuthenticatedUser, base_context, form_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::categories::find_category;
use crate::services::pages::{add_page as add_page_service, goto_page as goto_page_service};

fn render_add_page(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    category: &CategoryDto,
    form: &AddPageForm,
    errors: &FieldErrors,
) -> HttpResponse {
    let mut context = form_context(
        base_context(flash_messages, Some(user), "add_page"),
        form,
        errors,
    );
    context.insert("category", category);
    render_template(tera, "rango/add_page.html", &context)
}

#[get("/category/{slug}/page/add")]
pub async fn add_page_form(
    slug: web::Path<String>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match find_category(&slug, repo.get_ref()) {
        Ok(category) => render_add_page(
            &tera,
            &flash_messages,
            &user,
            &category,
            &AddPageForm::default(),
            &FieldErrors::new(),
        ),
        Err(ServiceError::NotFound) => redirect("/"),
        Err(err) => {
            log::error!("Failed to render add page form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/category/{slug}/page/add")]
pub async fn add_page(
    slug: web::Path<String>,
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<AddPageForm>,
) -> impl Responder {
    let category = match find_category(&slug, repo.get_ref()) {
        Ok(category) => category,
        Err(ServiceError::NotFound) => return redirect("/"),
        Err(err) => {
            log::error!("Failed to add page: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let payload: AddPageFormPayload = match form.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => {
            return render_add_page(
                &tera,
                &flash_messages,
                &user,
                &category,
                &form,
                e.field_errors(),
            );
        }
    };

    match add_page_service(&category.slug, payload, repo.get_ref()) {
        Ok(page) => {
            FlashMessage::success(format!("Page '{}' added.", page.title)).send();
            redirect(&format!("/category/{}", category.slug))
        }
        Err(ServiceError::NotFound) => redirect("/"),
        Err(err) => {
            log::error!("Failed to add page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/goto/{page_id}")]
pub async fn goto(page_id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match goto_page_service(page_id.into_inner(), repo.get_ref()) {
        Ok(url) => HttpResponse::Found()
            .insert_header((actix_web::http::header::LOCATION, url))
            .finish(),
        Err(ServiceError::NotFound) => redirect("/"),
        Err(err) => {
            log::error!("Failed to follow page link: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
