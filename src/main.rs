use std::process::ExitCode;

use actix_web::HttpServer;
use taskledger::{build_app, config::Config, store, AppState};

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = match store::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to open document store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(store.clone(), &config);
    log::info!("Starting server at {}", config.server_url());
    log::info!("Swagger docs: {}/api-docs/", config.base_url);
    log::info!("OpenAPI document: {}/api-docs/openapi.json", config.base_url);

    let server = match HttpServer::new(move || build_app(state.clone()))
        .bind((config.server_host.as_str(), config.server_port))
    {
        Ok(server) => server,
        Err(e) => {
            log::error!("Failed to bind {}: {}", config.server_url(), e);
            store.close().await;
            return ExitCode::FAILURE;
        }
    };

    let result = server.run().await;
    store.close().await;
    log::info!("Server stopped");

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
