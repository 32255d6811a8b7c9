use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use config::Config;
use tera::Tera;

use rango::db::establish_connection_pool;
use rango::models::config::ServerConfig;
use rango::repository::DieselRepository;
use rango::routes::auth::{login, login_form, logout, register, register_form};
use rango::routes::categories::{add_category, add_category_form, like_category, show_category};
use rango::routes::main::{about, index, restricted};
use rango::routes::pages::{add_page, add_page_form, goto};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let secret_key = match Key::try_from(server_config.secret.as_bytes()) {
        Ok(key) => key,
        Err(e) => {
            log::error!("Secret must be at least 64 bytes long: {e}");
            std::process::exit(1);
        }
    };

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = match Tera::new(&format!("{}/**/*", server_config.templates_dir)) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Template parsing error(s): {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::create_dir_all(&server_config.media_root) {
        log::error!("Failed to create media root '{}': {e}", server_config.media_root);
        std::process::exit(1);
    }

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Starting Rango on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", &server_config.assets_dir))
            .service(Files::new("/media", &server_config.media_root))
            .service(index)
            .service(about)
            .service(restricted)
            .service(add_category_form)
            .service(add_category)
            .service(show_category)
            .service(like_category)
            .service(add_page_form)
            .service(add_page)
            .service(goto)
            .service(register_form)
            .service(register)
            .service(login_form)
            .service(login)
            .service(logout)
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
