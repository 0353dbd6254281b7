// server/src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crossdock_server::config::AppConfig;
use crossdock_server::state::AppState;
use crossdock_server::{seed, web};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // RUST_LOG overrides; `info` otherwise.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting crossdock server...");

  let config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  let state = AppState::build(config.clone());

  if config.seed_demo_data {
    match seed::seed_demo_data(&state) {
      Ok(summary) => tracing::info!(%summary, "Demo data seeded."),
      Err(e) => tracing::error!(error = %e, "Failed to seed demo data."),
    }
  }

  let server_address = format!("{}:{}", config.server_host, config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
