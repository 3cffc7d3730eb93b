pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use application::auth_service::AuthService;
use application::category_service::CategoryService;
use application::content_service::ContentService;
use application::knife_service::KnifeService;
use application::order_service::OrderService;
use config::AppConfig;
use handlers::AppState;
use infrastructure::admin_repo::DieselAdminRepository;
use infrastructure::category_repo::DieselCategoryRepository;
use infrastructure::cloudinary::CloudinaryImageStore;
use infrastructure::content_repo::DieselContentRepository;
use infrastructure::knife_repo::DieselKnifeRepository;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const CORS_MAX_AGE_SECS: usize = 3600;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Wires the Diesel repositories and the image store into the services.
pub fn build_state(pool: DbPool, config: &AppConfig) -> AppState {
    let knives = Arc::new(DieselKnifeRepository::new(pool.clone()));
    let categories = Arc::new(DieselCategoryRepository::new(pool.clone()));
    let orders = Arc::new(DieselOrderRepository::new(pool.clone()));
    let content = Arc::new(DieselContentRepository::new(pool.clone()));
    let admins = Arc::new(DieselAdminRepository::new(pool));

    let knife_service = Arc::new(KnifeService::new(knives, categories.clone()));

    AppState {
        knives: knife_service.clone(),
        categories: Arc::new(CategoryService::new(categories)),
        orders: Arc::new(OrderService::new(orders, knife_service)),
        content: Arc::new(ContentService::new(content)),
        auth: Arc::new(AuthService::new(admins, config.auth.clone())),
        images: Arc::new(CloudinaryImageStore::new(config.cloudinary.clone())),
    }
}

fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(CORS_MAX_AGE_SECS)
}

/// Build and return an actix-web `Server` bound to the configured host and port.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(state: AppState, config: &AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let origins = config.cors_allowed_origins.clone();
    let state = web::Data::new(state);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(&origins))
            .wrap(Logger::default())
            .service(openapi::swagger_ui())
            .configure(handlers::configure)
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
