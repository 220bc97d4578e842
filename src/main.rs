use dotenvy::dotenv;
use order_lifecycle::{build_order_service, build_server, create_pool, run_migrations};
use order_lifecycle::{Settings, StartupError};

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env()?;

    let pool = create_pool(&settings.database_url, settings.timeouts.repository)?;
    run_migrations(&pool)?;

    let service = build_order_service(&settings, pool)?;

    log::info!(
        "Starting server at http://{}:{} (inventory topic '{}')",
        settings.host,
        settings.port,
        settings.kafka_topic
    );

    build_server(service, &settings.host, settings.port)?.await?;
    Ok(())
}
