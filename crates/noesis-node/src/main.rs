//! # Noesis Node
//!
//! Runs one agent: a tick loop that turns percepts into plans, and an HTTP
//! API for inspecting and feeding it.

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod api;
mod config;
mod demo;
mod engine;
mod state;

use config::NodeConfig;
use engine::Engine;
use state::AppState;

/// Run the node until the server stops.
pub async fn run_server(config: NodeConfig) -> anyhow::Result<()> {
    info!("Noesis node starting");

    let addr = config.listen;
    let seed_demo = config.demo;
    let (state, percepts) = AppState::new(config)?;
    if seed_demo {
        demo::kitchen(&state).await?;
    }

    let engine = Engine::new(state.clone(), percepts);
    tokio::spawn(engine.run());

    let app = create_router(state);

    info!("Listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router.
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/v1/beliefs", get(api::mind::list_beliefs))
        .route("/api/v1/desires", get(api::mind::list_desires))
        .route(
            "/api/v1/percepts",
            get(api::mind::list_percepts).post(api::mind::submit_percept),
        )
        .route("/api/v1/plan", get(api::plan::current_plan))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = NodeConfig::load()?;
    run_server(config).await
}
