use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use taskflow_be::api_doc::ApiDoc;
use taskflow_be::config::AppConfig;
use taskflow_be::handlers;
use taskflow_be::services::deadline::run_deadline_sweep;
use taskflow_be::services::scheduler::spawn_periodic_sweep;
use taskflow_be::state::AppServices;
use taskflow_be::Database;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    let config = AppConfig::from_env()?;
    let services = AppServices::from_config(&config)?;

    log::info!("🚀 Starting Taskflow Backend API on port {} ({})", config.port, config.environment);
    log::info!("📋 Allowed frontend URLs: {:?}", config.frontend_urls);

    let db = Arc::new(Database::new(&config.database_url).await?);
    db.check_tables().await?;
    if config.is_development() {
        db.get_stats().await?.log_stats();
    }

    // Every process start checks deadlines once before serving.
    if let Err(e) = run_deadline_sweep(db.as_ref(), services.clock.as_ref()).await {
        log::error!("Startup deadline sweep failed: {}", e);
    }

    if let Some(every) = config.sweep_interval {
        spawn_periodic_sweep(db.clone(), services.clock.clone(), every);
    }

    let port = config.port;
    let allowed_origins = config.frontend_urls.clone();
    let db_data = web::Data::from(db);
    let config_data = web::Data::new(config);
    let services_data = web::Data::new(services);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                "Authorization",
                "Content-Type",
                "Accept",
                "Origin",
                "X-Requested-With",
            ])
            .supports_credentials();

        // Add allowed origins
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(actix_web::middleware::Logger::default())
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(services_data.clone())
            .configure(handlers::health::configure)
            .configure(handlers::auth_config)
            .configure(handlers::task_config)
            .configure(handlers::notification_config)
            .configure(handlers::employee_config)
            .configure(handlers::deadline_config)
            .configure(handlers::webhook_config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
