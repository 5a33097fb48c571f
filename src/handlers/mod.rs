pub mod application;

use actix_web::{
    cookie::{time::OffsetDateTime, Cookie, CookieBuilder, SameSite},
    web::{Data, Json},
    HttpRequest, HttpResponse,
};

use crate::config::Config;
use crate::context::SESSION_COOKIE;
use crate::core::models::admin::UpsertOutcome;
use crate::core::ports::repository::AdminCommon;
use crate::core::services::auth;
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::request::Login;
use crate::response::{LoggedIn, Message};

pub static SETUP_SECRET_HEADER: &str = "x-setup-secret";

fn session_cookie(token: String) -> Cookie<'static> {
    CookieBuilder::new(SESSION_COOKIE, token).path("/").http_only(true).same_site(SameSite::Lax).finish()
}

pub async fn login<D>(Json(Login { username, password }): Json<Login>, db: Data<D>, tokener: Data<JWT>) -> Result<HttpResponse, Error>
where
    D: AdminCommon + 'static,
{
    let session = auth::login(db.get_ref(), tokener.get_ref(), &username, &password).await?;
    Ok(HttpResponse::Ok().cookie(session_cookie(session.token.clone())).json(LoggedIn {
        message: "Login successful",
        token: session.token,
        admin: session.admin,
    }))
}

pub async fn logout() -> HttpResponse {
    let mut cookie = session_cookie(String::new());
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    HttpResponse::Ok().cookie(cookie).json(Message::new("Logged out successfully"))
}

pub async fn setup_admin<D>(req: HttpRequest, db: Data<D>, config: Data<Config>) -> Result<Json<Message>, Error>
where
    D: AdminCommon + 'static,
{
    let supplied = req.headers().get(SETUP_SECRET_HEADER).and_then(|v| v.to_str().ok());
    match (config.setup_secret.as_deref(), supplied) {
        (Some(expected), Some(supplied)) if auth::constant_time_str_eq(expected, supplied) => {}
        _ => return Err(Error::Forbidden),
    }
    let seed = config
        .admin_seed()
        .ok_or_else(|| Error::ConfigError("ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD must be set".into()))?;
    let username = seed.username.clone();
    let message = match auth::setup_admin(db.get_ref(), seed).await? {
        UpsertOutcome::Created => "Admin created successfully",
        UpsertOutcome::Reset => "Admin password reset successfully",
    };
    log::info!("{} ({})", message, username);
    Ok(Json(Message::new(message)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::test::config_with;
    use crate::request::json_config;
    use crate::test_support::MemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::web::{get, post};
    use actix_web::App;
    use serde_json::{json, Value};

    fn configured() -> Config {
        config_with(&[
            ("SETUP_SECRET", "open-sesame"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
    }

    macro_rules! app {
        ($db:expr, $config:expr) => {
            init_service(
                App::new()
                    .app_data($db.clone())
                    .app_data(Data::new(JWT::new(b"secret".to_vec())))
                    .app_data(Data::new($config))
                    .app_data(json_config())
                    .route("/auth/login", post().to(login::<MemoryStore>))
                    .route("/auth/logout", post().to(logout))
                    .route("/setup-admin", get().to(setup_admin::<MemoryStore>)),
            )
            .await
        };
    }

    fn setup_request(secret: &str) -> TestRequest {
        TestRequest::get().uri("/setup-admin").insert_header((SETUP_SECRET_HEADER, secret))
    }

    #[actix_web::test]
    async fn test_setup_then_login() {
        let db = Data::new(MemoryStore::default());
        let app = app!(db, configured());

        let resp = call_service(&app, setup_request("open-sesame").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Admin created successfully");
        assert!(!body.to_string().contains("hunter2"));

        let resp = call_service(&app, setup_request("open-sesame").to_request()).await;
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["message"], "Admin password reset successfully");

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "root", "password": "hunter2"}))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.response().cookies().find(|c| c.name() == SESSION_COOKIE).unwrap();
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        let cookie_token = cookie.value().to_owned();
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["token"], cookie_token.as_str());
        assert_eq!(body["admin"]["email"], "root@x.com");
    }

    #[actix_web::test]
    async fn test_wrong_password_sets_no_cookie() {
        let db = Data::new(MemoryStore::default());
        let app = app!(db, configured());
        call_service(&app, setup_request("open-sesame").to_request()).await;

        let req = TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "root", "password": "wrong"}))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.response().cookies().count(), 0);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn test_malformed_login_body_is_json_error() {
        let db = Data::new(MemoryStore::default());
        let app = app!(db, configured());
        let req = TestRequest::post()
            .uri("/auth/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"username\": \"root\"")
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));

        let req = TestRequest::post().uri("/auth/login").set_json(json!({"username": "root"})).to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_logout_clears_cookie() {
        let db = Data::new(MemoryStore::default());
        let app = app!(db, configured());
        let resp = call_service(&app, TestRequest::post().uri("/auth/logout").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.response().cookies().find(|c| c.name() == SESSION_COOKIE).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
    }

    #[actix_web::test]
    async fn test_setup_guarded_by_secret() {
        let db = Data::new(MemoryStore::default());
        let app = app!(db, configured());
        let resp = call_service(&app, TestRequest::get().uri("/setup-admin").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let resp = call_service(&app, setup_request("guess").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let resp = call_service(&app, setup_request("open-sesamf").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(db.get_active_by_username("root").await.unwrap().is_none());

        let app = app!(db, config_with(&[]));
        let resp = call_service(&app, setup_request("").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_setup_without_admin_credentials() {
        let db = Data::new(MemoryStore::default());
        let app = app!(db, config_with(&[("SETUP_SECRET", "open-sesame")]));
        let resp = call_service(&app, setup_request("open-sesame").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(db.get_active_by_username("root").await.unwrap().is_none());
    }
}
