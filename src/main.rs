use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;

use workers_manager::config::Settings;
use workers_manager::{db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::other(e)
    })?;

    let pool = db::connect(&settings.database_url, settings.max_connections)
        .await
        .map_err(|e| {
            error!("Failed to create pool: {}", e);
            io::Error::other(e)
        })?;
    db::init_db(&pool).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        io::Error::other(e)
    })?;

    info!(
        "{} ({}) running at http://{}",
        settings.app_name, settings.environment, settings.bind_address
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .configure(routes::routes::health_configure)
            .configure(routes::routes::workers_configure)
            .configure(routes::routes::assignments_configure)
            .configure(routes::routes::queues_configure)
    })
    .bind(settings.bind_address.as_str())?
    .run()
    .await
}
