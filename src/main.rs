mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::services::{CloudinaryClient, GeminiClient};
use crate::state::AppState;

// Imagens em base64 chegam no corpo JSON
const JSON_BODY_LIMIT: usize = 8 * 1024 * 1024;

fn startup_error(msg: impl std::fmt::Display) -> std::io::Error {
    log::error!("❌ {}", msg);
    std::io::Error::new(std::io::ErrorKind::Other, msg.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(startup_error)?;

    log::info!("🚀 Starting Voice Assistant Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| startup_error(format!("Failed to connect to MongoDB: {}", e)))?;
    log::info!("✅ MongoDB connected successfully");

    let gemini = GeminiClient::new(&config.gemini).map_err(startup_error)?;
    let cloudinary = CloudinaryClient::new(&config.cloudinary);
    if !cloudinary.is_configured() {
        log::warn!("⚠️  Cloudinary not configured: avatar uploads will fail, preset URLs still work");
    }

    let db_data = web::Data::new(db);
    let auth_data = web::Data::new(config.auth.clone());
    let state_data = web::Data::new(AppState {
        model: Arc::new(gemini),
        uploader: Arc::new(cloudinary),
        max_image_bytes: config.cloudinary.max_image_bytes,
    });

    let host = config.host.clone();
    let port = config.port.clone();
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("🔓 CORS origins: {:?}", cors_origins);

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(auth_data.clone())
            .app_data(state_data.clone())
            .app_data(web::JsonConfig::default().limit(JSON_BODY_LIMIT))
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Metrics
            .route("/metrics", web::get().to(api::metrics::get_metrics))
            // Auth endpoints
            .service(
                web::scope("/api/auth")
                    .route("/signup", web::post().to(api::auth::sign_up))
                    .route("/signin", web::post().to(api::auth::sign_in))
                    .route("/logout", web::get().to(api::auth::logout)),
            )
            // User + assistant: requires token
            .service(
                web::scope("/api/user")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/current", web::get().to(api::user::get_current_user))
                    .route("/update", web::post().to(api::user::update_assistant))
                    .route("/asktoassistant", web::post().to(api::user::ask_to_assistant)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
