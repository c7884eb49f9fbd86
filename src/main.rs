use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use rental_api::auth::TokenSigner;
use rental_api::config::Config;
use rental_api::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("{e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("Connecting to database...");
    let pool = db::get_db_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(std::io::Error::other)?;

    log::info!("Running migrations...");
    db::run_migrations(&pool)
        .await
        .map_err(std::io::Error::other)?;

    log::info!("Starting server at http://{}:{}", config.bind_addr, config.port);

    let pool_data = web::Data::new(pool);
    let signer = web::Data::new(TokenSigner::new(&config.auth_secret, config.token_ttl_hours));

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(signer.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
