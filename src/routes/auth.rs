use std::path::Path;

use actix_identity::{Identity, IdentityExt};
use actix_multipart::form::MultipartForm;
use actix_web::http::header::ContentType;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::FieldErrors;
use crate::forms::auth::{
    LoginForm, LoginFormPayload, PictureUpload, RegisterFields, RegisterForm, RegisterFormPayload,
};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{AuthenticatedUser, base_context, form_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::auth::{authenticate, register_user};

pub const INVALID_LOGIN_MESSAGE: &str = "Invalid login details supplied.";
pub const DISABLED_ACCOUNT_MESSAGE: &str = "Your Rango account is disabled.";

fn render_register(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    form: &RegisterFields,
    errors: &FieldErrors,
    registered: bool,
) -> HttpResponse {
    let mut context = form_context(
        base_context(flash_messages, user, "register"),
        form,
        errors,
    );
    context.insert("registered", &registered);
    render_template(tera, "rango/register.html", &context)
}

#[get("/register")]
pub async fn register_form(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_register(
        &tera,
        &flash_messages,
        user.as_ref(),
        &RegisterFields::default(),
        &FieldErrors::new(),
        false,
    )
}

#[post("/register")]
pub async fn register(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
    MultipartForm(form): MultipartForm<RegisterForm>,
) -> impl Responder {
    let (fields, picture) = form.into_parts();
    let render_errors = |errors: &FieldErrors| {
        render_register(&tera, &flash_messages, user.as_ref(), &fields, errors, false)
    };

    let payload: RegisterFormPayload = match fields.clone().try_into() {
        Ok(payload) => payload,
        Err(e) => return render_errors(e.field_errors()),
    };

    let picture = match picture.map(PictureUpload::from_temp_file).transpose() {
        Ok(picture) => picture.flatten(),
        Err(e) => return render_errors(e.field_errors()),
    };

    match register_user(
        payload,
        picture,
        Path::new(&server_config.media_root),
        repo.get_ref(),
    ) {
        Ok(_) => render_register(
            &tera,
            &flash_messages,
            user.as_ref(),
            &RegisterFields::default(),
            &FieldErrors::new(),
            true,
        ),
        Err(ServiceError::Conflict(message)) => {
            render_errors(&FieldErrors::single("username", message))
        }
        Err(err) => {
            log::error!("Failed to register user: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn plain_text(message: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(message.to_string())
}

#[get("/login")]
pub async fn login_form(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = form_context(
        base_context(&flash_messages, user.as_ref(), "login"),
        &LoginForm::default(),
        &FieldErrors::new(),
    );
    render_template(&tera, "rango/login.html", &context)
}

#[post("/login")]
pub async fn login(
    request: HttpRequest,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    let payload: LoginFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(_) => return plain_text(INVALID_LOGIN_MESSAGE),
    };

    match authenticate(payload, repo.get_ref()) {
        Ok(user) => {
            if let Err(e) = Identity::login(&request.extensions(), user.username.to_string()) {
                log::error!("Failed to attach identity: {e}");
                return HttpResponse::InternalServerError().finish();
            }
            FlashMessage::success(format!("Welcome back, {}.", user.username)).send();
            redirect("/")
        }
        Err(ServiceError::Unauthorized) => {
            log::warn!("Invalid login details supplied");
            plain_text(INVALID_LOGIN_MESSAGE)
        }
        Err(ServiceError::Forbidden) => plain_text(DISABLED_ACCOUNT_MESSAGE),
        Err(err) => {
            log::error!("Failed to log in: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/logout")]
pub async fn logout(request: HttpRequest, user: AuthenticatedUser) -> impl Responder {
    if let Ok(identity) = request.get_identity() {
        identity.logout();
    }
    log::info!("User '{}' logged out", user.username);
    redirect("/")
}
