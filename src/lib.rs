pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_service::{OrderService, Timeouts};
pub use config::Settings;
pub use db::{create_pool, DbPool};
pub use errors::StartupError;

use infrastructure::kafka::KafkaInventoryPublisher;
use infrastructure::order_repo::DieselOrderRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), StartupError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| StartupError::Migrations(e.to_string()))?;
    Ok(())
}

/// Wire the lifecycle service to PostgreSQL and Kafka.
pub fn build_order_service(settings: &Settings, pool: DbPool) -> Result<OrderService, StartupError> {
    let publisher = KafkaInventoryPublisher::new(
        &settings.kafka_brokers,
        &settings.kafka_topic,
        settings.timeouts.publish,
    )?;

    Ok(OrderService::new(
        Arc::new(DieselOrderRepository::new(
            pool,
            settings.timeouts.repository,
        )),
        Arc::new(publisher),
        settings.timeouts,
    ))
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: OrderService,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
