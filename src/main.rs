use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(&config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let db_pool = web::Data::new(state.db_pool.clone());
    let vendors = web::Data::new(state.vendors.clone());
    let rfps = web::Data::new(state.rfps.clone());
    let proposals = web::Data::new(state.proposals.clone());
    let events = web::Data::new(state.events.clone());
    let intake = web::Data::from(Arc::clone(&state.intake));
    let dispatch = web::Data::from(Arc::clone(&state.dispatch));
    let inbound = web::Data::from(Arc::clone(&state.inbound));
    let comparison = web::Data::from(Arc::clone(&state.comparison));

    let frontend_origin = config.frontend_origin.clone();

    tracing::info!("Starting rfpflow server on {}", bind_addr);

    HttpServer::new(move || {
        let cors = match frontend_origin.as_deref() {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(cors)
            .app_data(db_pool.clone())
            .app_data(vendors.clone())
            .app_data(rfps.clone())
            .app_data(proposals.clone())
            .app_data(events.clone())
            .app_data(intake.clone())
            .app_data(dispatch.clone())
            .app_data(inbound.clone())
            .app_data(comparison.clone())
            .configure(api::health::configure)
            .configure(api::openapi::configure)
            .configure(api::vendors::configure)
            .configure(api::rfps::configure)
            .configure(api::proposals::configure)
            .configure(api::webhooks::configure)
            .configure(api::events::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
