#![deny(missing_docs)]
//! CloudProof server executable.
//!
//! Serves heatmap normalization, CloudTrail scoring and the scoring table
//! over HTTP. The server keeps no state between requests.

mod config;
mod openapi;
mod routes;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
#[cfg(not(test))]
use log::info;

#[cfg(not(test))]
use crate::config::ServerConfig;
#[cfg(not(test))]
use crate::routes::{AppState, configure};

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env()?;

    let state = web::Data::new(AppState::new(config.default_days));
    let allowed_origins = config.ui_origins.clone();
    info!(
        "listening on {}:{} (default window {} days)",
        config.host, config.port, config.default_days
    );

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::CONTENT_ENCODING])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}
