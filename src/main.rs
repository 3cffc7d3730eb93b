use blade_commerce::config::AppConfig;
use blade_commerce::{build_server, build_state, create_pool, run_migrations};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = create_pool(&config.database_url).map_err(|e| {
        log::error!("Failed to create DB pool: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run database migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let state = build_state(pool, &config);
    let admin = config.admin.clone();
    let auth = state.auth.clone();
    let seeded = actix_web::web::block(move || {
        auth.ensure_admin(&admin.username, &admin.password, &admin.email)
    })
    .await;
    match seeded {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => log::error!("Failed to seed admin user: {}", e),
        Err(e) => log::error!("Admin seeding was cancelled: {}", e),
    }
    if config.cloudinary.is_none() {
        log::warn!("Cloudinary is not configured; image uploads will be rejected");
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config)?.await
}
