use std::env;
use std::sync::Arc;

use api::config::AppConfig;
use api::state::AppState;

#[tokio::main]
async fn main() {
    install_panic_hook();
    init_tracing();
    api::config::load_dotenv();
    log_runtime_config();

    // Load configuration from environment
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    let addr = format!("{}:{}", config.ip, config.port);

    let state = match AppState::from_config(config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("Failed to initialize AppState: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = serve(&addr, state).await {
        tracing::error!("server error: {:#}", e);
        std::process::exit(1);
    }
}

async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, server::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {info}");
    }));
}

fn log_runtime_config() {
    let ip = env::var("IP").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mode = env::var("APP_MODE").unwrap_or_else(|_| "<unset>".to_string());

    tracing::info!("startup: IP={ip} PORT={port} APP_MODE={mode}");

    // Required storage keys are enforced by AppConfig; only note the optional ones.
    if api::config::AppMode::from_env() == api::config::AppMode::Production {
        log_unset_envs("storage", &["STORAGE_ENDPOINT", "STORAGE_PUBLIC_URL"]);
    }
}

fn log_unset_envs(group: &str, keys: &[&str]) {
    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| env::var(key).ok().is_none())
        .collect();
    if missing.is_empty() {
        return;
    }

    tracing::info!("startup: optional {group} envs not set: {}", missing.join(", "));
}
