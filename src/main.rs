//! Study OS Back binary entrypoint wiring the REST API and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_os_back::{
    config::AppConfig,
    dao::{
        retry::RetryPolicy,
        storage::StorageError,
        user_store::{
            UserStore,
            memory::MemoryUserStore,
            sheets::{SheetsConfig, SheetsUserStore},
        },
    },
    oracle::{OracleBackend, gemini::GeminiOracle},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let oracle = build_oracle();
    let app_state = AppState::new(config, oracle);

    let backend = env::var("STUDY_OS_STORE").unwrap_or_else(|_| "sheets".into());
    tokio::spawn(run_store_supervisor(app_state.clone(), backend));

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Run the storage supervisor with the backend selected by `STUDY_OS_STORE`.
async fn run_store_supervisor(state: SharedState, backend: String) {
    match backend.as_str() {
        "memory" => {
            storage_supervisor::run(state, || async {
                Ok(Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>)
            })
            .await;
        }
        _ => {
            storage_supervisor::run(state, || async {
                let config = SheetsConfig::from_env().map_err(StorageError::from)?;
                let store = SheetsUserStore::connect(config, RetryPolicy::default())
                    .await
                    .map_err(StorageError::from)?;
                Ok(Arc::new(store) as Arc<dyn UserStore>)
            })
            .await;
        }
    }
}

/// Build the oracle backend when a provider credential is configured.
fn build_oracle() -> Option<Arc<dyn OracleBackend>> {
    match GeminiOracle::from_env() {
        Some(Ok(oracle)) => {
            info!("oracle backend configured");
            Some(Arc::new(oracle))
        }
        Some(Err(err)) => {
            warn!(error = %err, "failed to build the oracle backend; continuing without it");
            None
        }
        None => {
            info!("no oracle credential configured; oracle answers in character");
            None
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
