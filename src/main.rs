mod config;
mod db;
mod error;
mod handlers;
mod models;
mod notifier;
mod services;
mod state;
mod validation;

use config::Config;
use db::Db;
use notifier::LogNotifier;
use ntex::web;
use ntex_cors::Cors;
use services::ranking::RankingEngine;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "typing_leaderboard=info".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[ntex::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    init_tracing(config.json_logs);
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let db = Db::open(&config.db_path, config.busy_timeout).map_err(|e| {
        tracing::error!("Failed to open database {}: {}", config.db_path, e);
        std::io::Error::other(e)
    })?;
    let state = AppState::new(
        db,
        RankingEngine::new(config.leaderboard_size),
        Arc::new(LogNotifier),
    );

    tracing::info!(
        "Typing leaderboard starting on {}:{} (database {})",
        config.host,
        config.port,
        config.db_path
    );

    web::HttpServer::new(move || {
        web::App::new()
            .state(state.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .route("/api/health", web::get().to(health))
            // Results coming out of the classifier
            .route("/api/submissions", web::post().to(handlers::records::submit_record))
            .route(
                "/api/classifier-output",
                web::post().to(handlers::records::submit_classifier_output),
            )
            .route("/api/records/{id}", web::get().to(handlers::records::get_record))
            // Operator commands (!top16, !fix)
            .route("/api/commands", web::post().to(handlers::commands::run_command))
            .route("/api/leaderboard", web::get().to(handlers::leaderboard::get_leaderboard))
    })
    .bind(format!("{}:{}", config.host, config.port))?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
