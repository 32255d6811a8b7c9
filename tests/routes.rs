use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use chrono::Utc;
use rango::domain::types::Username;
use rango::domain::user::{NewUser, NewUserProfile};
use rango::models::config::ServerConfig;
use rango::repository::{DieselRepository, UserWriter};
use rango::routes::auth::{login, login_form, logout, register, register_form};
use rango::routes::categories::{add_category, add_category_form, like_category, show_category};
use rango::routes::main::{about, index, restricted};
use rango::routes::pages::{add_page, add_page_form, goto};
use tera::Tera;

mod common;

const BOUNDARY: &str = "rango-test-boundary";

macro_rules! rango_app {
    ($repo:expr) => {
        rango_app!($repo, std::env::temp_dir())
    };
    ($repo:expr, $media_root:expr) => {{
        let key = Key::generate();
        let message_store = CookieMessageStore::builder(key.clone()).build();
        let tera = Tera::new("templates/**/*").expect("templates should parse");
        let config = ServerConfig {
            address: "127.0.0.1".to_string(),
            port: 0,
            database_url: String::new(),
            secret: String::new(),
            templates_dir: "templates".to_string(),
            media_root: $media_root.display().to_string(),
            assets_dir: "assets".to_string(),
        };
        test::init_service(
            App::new()
                .wrap(FlashMessagesFramework::builder(message_store).build())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), key)
                        .cookie_secure(false)
                        .build(),
                )
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
                .app_data(web::Data::new($repo))
                .app_data(web::Data::new(tera))
                .app_data(web::Data::new(config)),
        )
        .await
    }};
}

fn response_cookies<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Vec<Cookie<'static>> {
    resp.response()
        .cookies()
        .map(|cookie| cookie.into_owned())
        .collect()
}

fn create_user(repo: &DieselRepository, username: &str, password: &str) {
    let user = NewUser {
        username: Username::new(username).expect("valid username"),
        email: String::new(),
        password_hash: bcrypt::hash(password, 4).expect("should hash"),
        date_joined: Utc::now().naive_utc(),
    };
    repo.create_user(&user, &NewUserProfile::default())
        .expect("should create user");
}

/// `multipart/form-data` body with text fields and an optional picture.
fn multipart_body(fields: &[(&str, &str)], picture: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = picture {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"picture\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn register_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/register")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::new(1, 1)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("should encode png");
    bytes
}

fn stored_pictures(media_root: &std::path::Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(media_root.join("profile_images")) {
        Ok(entries) => entries
            .map(|entry| entry.expect("readable entry").path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[actix_web::test]
async fn first_visit_sets_last_visit_cookie() {
    let test_db = common::TestDb::new();
    let app = rango_app!(test_db.repository());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = response_cookies(&resp)
        .into_iter()
        .find(|c| c.name() == "last_visit")
        .expect("last_visit cookie should be set");
    assert_eq!(cookie.path(), Some("/"));
    assert!(
        chrono::NaiveDateTime::parse_from_str(cookie.value(), "%Y-%m-%d %H:%M:%S").is_ok(),
        "unexpected cookie value {:?}",
        cookie.value()
    );

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Visits: 1"));
}

#[actix_web::test]
async fn same_day_visit_keeps_cookie_and_count() {
    let test_db = common::TestDb::new();
    let app = rango_app!(test_db.repository());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookies = response_cookies(&resp);
    let first = cookies
        .iter()
        .find(|c| c.name() == "last_visit")
        .expect("last_visit cookie should be set")
        .value()
        .to_string();

    let mut req = test::TestRequest::get().uri("/");
    for cookie in &cookies {
        req = req.cookie(cookie.clone());
    }
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let second = response_cookies(&resp)
        .into_iter()
        .find(|c| c.name() == "last_visit")
        .expect("last_visit cookie should be echoed");
    assert_eq!(second.value(), first);

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Visits: 1"));
}

#[actix_web::test]
async fn old_cookie_counts_a_new_visit() {
    let test_db = common::TestDb::new();
    let app = rango_app!(test_db.repository());

    let req = test::TestRequest::get()
        .uri("/about")
        .cookie(Cookie::new("last_visit", "2024-01-01 00:00:00"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = response_cookies(&resp)
        .into_iter()
        .find(|c| c.name() == "last_visit")
        .expect("last_visit cookie should be set");
    assert_ne!(cookie.value(), "2024-01-01 00:00:00");

    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Visits: 2"));
}

#[actix_web::test]
async fn login_only_routes_redirect_anonymous_users() {
    let test_db = common::TestDb::new();
    let app = rango_app!(test_db.repository());

    for uri in ["/category/add", "/restricted", "/logout", "/category/python/page/add"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }

    let req = test::TestRequest::post()
        .uri("/category/add")
        .set_form([("name", "Python")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
}

#[actix_web::test]
async fn unknown_category_renders_empty_state() {
    let test_db = common::TestDb::new();
    let app = rango_app!(test_db.repository());

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/category/ruby").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("The specified category does not exist."));
}

#[actix_web::test]
async fn bad_credentials_are_reported_as_plain_text() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();
    create_user(&repo, "leifos", "secret");
    let app = rango_app!(repo);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "leifos"), ("password", "wrong")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, "Invalid login details supplied.");
}

#[actix_web::test]
async fn signed_in_user_adds_category_and_page() {
    let test_db = common::TestDb::new();
    let repo = test_db.repository();
    create_user(&repo, "leifos", "secret");
    let app = rango_app!(repo);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "leifos"), ("password", "secret")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    let cookies = response_cookies(&resp);

    let with_cookies = |mut req: test::TestRequest| {
        for cookie in &cookies {
            req = req.cookie(cookie.clone());
        }
        req
    };

    let resp = test::call_service(
        &app,
        with_cookies(test::TestRequest::get().uri("/restricted")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = with_cookies(test::TestRequest::post().uri("/category/add"))
        .set_form([("name", "Python")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let req = with_cookies(test::TestRequest::post().uri("/category/add"))
        .set_form([("name", "Python")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Category with this name already exists."));

    let req = with_cookies(test::TestRequest::post().uri("/category/python/page/add"))
        .set_form([("title", "Official Tutorial"), ("url", "docs.python.org")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/category/python"
    );

    let req = with_cookies(test::TestRequest::post().uri("/category/flask/page/add"))
        .set_form([("title", "Flask Tutorial"), ("url", "flask.palletsprojects.com")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/goto/1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "http://docs.python.org"
    );
}

#[actix_web::test]
async fn registration_with_picture_then_duplicate_username() {
    let test_db = common::TestDb::new();
    let media = tempfile::tempdir().expect("should create media dir");
    let app = rango_app!(test_db.repository(), media.path());

    let fields = [
        ("username", "leifos"),
        ("email", "leifos@example.com"),
        ("password", "secret"),
        ("website", "www.leifos.com"),
    ];
    let png = png_bytes();

    let req = register_request(multipart_body(&fields, Some(("avatar.png", &png)))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Thank you for registering!"));

    let pictures = stored_pictures(media.path());
    assert_eq!(pictures.len(), 1);
    assert_eq!(std::fs::read(&pictures[0]).expect("stored picture"), png);

    let req = register_request(multipart_body(&fields, Some(("avatar.png", &png)))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("A user with that username already exists."));
    assert!(!body.contains("Thank you for registering!"));
    assert_eq!(stored_pictures(media.path()), pictures);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("username", "leifos"), ("password", "secret")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let mut req = test::TestRequest::get().uri("/restricted");
    for cookie in response_cookies(&resp) {
        req = req.cookie(cookie);
    }
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("Website:"));
    assert!(body.contains("www.leifos.com"));
    assert!(body.contains("leifos-"));
}

#[actix_web::test]
async fn registration_rejects_script_named_as_picture() {
    let test_db = common::TestDb::new();
    let media = tempfile::tempdir().expect("should create media dir");
    let app = rango_app!(test_db.repository(), media.path());

    let body = multipart_body(
        &[("username", "leifos"), ("password", "secret")],
        Some(("avatar.png", b"#!/bin/sh\necho hi\n")),
    );
    let resp = test::call_service(&app, register_request(body).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(body.contains("Upload a valid image."));
    assert!(stored_pictures(media.path()).is_empty());
}
