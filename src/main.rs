extern crate actix_multipart;
extern crate actix_web;
extern crate chrono;
extern crate dotenv;
extern crate env_logger;
extern crate futures_util;
extern crate hex;
extern crate itertools;
extern crate jsonwebtoken;
extern crate rand;
extern crate serde;
extern crate serde_json;
extern crate sha2;
extern crate subtle;
extern crate sqlx;
extern crate thiserror;
extern crate tokio;

mod config;
mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
pub mod request;
pub mod response;
#[cfg(test)]
mod test_support;

use std::path::Path;
use std::sync::Arc;

use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::web::{delete, get, patch, post, put, scope, Data};
use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use config::Config;
use database::sqlx::PgSqlx;
use handlers::application;
use impls::limiters::memory::MemoryLimiter;
use impls::tokener::jwt::JWT;
use impls::uploaders::local_storage::LocalStorage;
use middlewares::guard::EdgeGuard;

const DEFAULT_LOG_FILTER: &str = "actix_web=info,recruit=info";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{}", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let resume_dir = Path::new(&config.upload_path).join("resumes");
    tokio::fs::create_dir_all(&resume_dir).await?;

    let tokener = Data::new(JWT::new(config.jwt_secret.as_bytes().to_owned()));
    let db = Data::new(PgSqlx::new(pool));
    let uploader = Data::new(LocalStorage::new(&config.upload_path, &config.public_base_url));
    let limiter = Arc::new(MemoryLimiter::new(config.rate_limit_window, config.rate_limit_max));
    MemoryLimiter::spawn_sweeper(&limiter, config.rate_limit_sweep);
    let limiter = Data::from(limiter);

    if config.setup_secret.is_none() {
        log::warn!("SETUP_SECRET is not set, /api/setup-admin is disabled");
    }
    let bind_addr = config.bind_addr.clone();
    let config = Data::new(config);
    log::info!("listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(tokener.clone())
            .app_data(db.clone())
            .app_data(uploader.clone())
            .app_data(limiter.clone())
            .app_data(config.clone())
            .app_data(request::json_config())
            .app_data(request::query_config())
            .service(
                scope("/api")
                    .route("/auth/login", post().to(handlers::login::<PgSqlx>))
                    .route("/auth/logout", post().to(handlers::logout))
                    .route("/setup-admin", get().to(handlers::setup_admin::<PgSqlx>))
                    .service(
                        scope("/applications")
                            .route("", post().to(application::submit::<PgSqlx, LocalStorage, MemoryLimiter>))
                            .route("", get().to(application::list::<PgSqlx>))
                            .route("/export", get().to(application::export::<PgSqlx>))
                            .route("/stats", get().to(application::stats::<PgSqlx>))
                            .route("/track", post().to(application::track::<PgSqlx>))
                            .route("/{id}", get().to(application::detail::<PgSqlx>))
                            .route("/{id}", put().to(application::update::<PgSqlx>))
                            .route("/{id}", patch().to(application::update_status::<PgSqlx>))
                            .route("/{id}", delete().to(application::delete::<PgSqlx, LocalStorage>))
                            .route("/{id}/resume", get().to(application::resume::<PgSqlx, LocalStorage>)),
                    ),
            )
            .service(Files::new("/resumes", resume_dir.clone()))
            .service(
                scope("")
                    .wrap(EdgeGuard::new(tokener.get_ref().clone()))
                    .service(Files::new("/", config.static_dir.clone()).index_file("index.html")),
            )
    })
    .bind(bind_addr)?
    .run()
    .await?;
    Ok(())
}
