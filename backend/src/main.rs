pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod render;
pub mod routes;
pub mod session;

use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::{debug, info};

use config::Config;
use error::ApiError;
use inference::get_model;
use session::SessionStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    info!("Starting earthquake prediction server");

    let config = Config::from_env();
    debug!("Configuration: {:?}", config);

    let model_data = web::Data::new(get_model());
    let sessions = web::Data::new(SessionStore::new(
        config.session_ttl,
        config.max_sessions,
    ));

    let bind_address = config.bind_addr();
    let cors_config = config.clone();
    let static_dir = config.static_dir.clone();

    info!("Server listening on http://{}", bind_address);
    info!("Workers: {}", config.workers);
    info!(
        "Session TTL: {}s, max sessions: {}",
        config.session_ttl.as_secs(),
        config.max_sessions
    );
    if config.allow_any_origin {
        info!("CORS: any origin allowed");
    }
    info!("Endpoints:");
    info!("   GET    /                                   - New form session");
    info!("   GET    /sessions/{{id}}                     - Form page");
    info!("   POST   /sessions/{{id}}                     - Submit form");
    info!("   POST   /api/sessions                       - Open session");
    info!("   GET    /api/sessions/{{id}}                 - Session state");
    info!("   POST   /api/sessions/{{id}}/ready           - Readiness signal");
    info!("   PUT    /api/sessions/{{id}}/fields/{{f}}     - Update field");
    info!("   PUT    /api/sessions/{{id}}/selections/{{f}} - Select option");
    info!("   POST   /api/sessions/{{id}}/submit          - Submit");
    info!("   DELETE /api/sessions/{{id}}                 - End session");
    info!("   POST   /api/predict                        - Stateless prediction");
    info!("   GET    /api/health | /api/model-info | /api/stats");

    HttpServer::new(move || {
        let cors = cors_config.cors();

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(model_data.clone())
            .app_data(sessions.clone())
            .configure(routes::configure)
            .service(Files::new("/static", &static_dir).prefer_utf8(true))
            .default_service(web::route().to(|| async {
                Err::<actix_web::HttpResponse, _>(ApiError::NotFound)
            }))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
