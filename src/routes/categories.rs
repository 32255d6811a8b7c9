use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::dto::categories::CategoryDto;
use crate::forms::FieldErrors;
use crate::forms::categories::{AddCategoryForm, AddCategoryFormPayload};
use crate::repository::DieselRepository;
use crate::routes::{AuthenticatedUser, base_context, form_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::categories::{
    add_category as add_category_service, like_category as like_category_service,
    show_category as show_category_service,
};

fn render_add_category(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    form: &AddCategoryForm,
    errors: &FieldErrors,
) -> HttpResponse {
    let context = form_context(
        base_context(flash_messages, Some(user), "add_category"),
        form,
        errors,
    );
    render_template(tera, "rango/add_category.html", &context)
}

#[get("/category/add")]
pub async fn add_category_form(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_add_category(
        &tera,
        &flash_messages,
        &user,
        &AddCategoryForm::default(),
        &FieldErrors::new(),
    )
}

#[post("/category/add")]
pub async fn add_category(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<AddCategoryForm>,
) -> impl Responder {
    let payload: AddCategoryFormPayload = match form.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => {
            return render_add_category(
                &tera,
                &flash_messages,
                &user,
                &form,
                e.field_errors(),
            );
        }
    };

    match add_category_service(payload, repo.get_ref()) {
        Ok(category) => {
            FlashMessage::success(format!("Category '{}' added.", category.name)).send();
            redirect("/")
        }
        Err(ServiceError::Conflict(message)) => render_add_category(
            &tera,
            &flash_messages,
            &user,
            &form,
            &FieldErrors::single("name", message),
        ),
        Err(err) => {
            log::error!("Failed to add category: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/category/{slug}")]
pub async fn show_category(
    slug: web::Path<String>,
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, user.as_ref(), "category");

    match show_category_service(&slug, repo.get_ref()) {
        Ok(details) => {
            context.insert("category", &details.category);
            context.insert("pages", &details.pages);
        }
        Err(ServiceError::NotFound) => {
            context.insert("category", &None::<CategoryDto>);
            context.insert("pages", &Vec::<()>::new());
        }
        Err(err) => {
            log::error!("Failed to render category page: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    render_template(&tera, "rango/category.html", &context)
}

#[post("/category/{slug}/like")]
pub async fn like_category(
    slug: web::Path<String>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match like_category_service(&slug, repo.get_ref()) {
        Ok(_) => redirect(&format!("/category/{slug}")),
        Err(ServiceError::NotFound) => redirect("/"),
        Err(err) => {
            log::error!("Failed to like category: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
