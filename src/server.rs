use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::agent::AgentState;
use crate::world::World;

/// Body returned to polling clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerResponse {
    pub agents: Vec<AgentState>,
}

pub type SharedWorld = Arc<Mutex<World>>;

pub fn build_router(world: SharedWorld) -> Router {
    Router::new()
        .route("/", get(tick_agents))
        .route("/agents", get(get_agents))
        .route("/health", get(health))
        .with_state(world)
}

/// Advance every agent one step and return their states
async fn tick_agents(State(world): State<SharedWorld>) -> impl IntoResponse {
    let agents = world.lock().await.tick();
    debug!(agents = agents.len(), "sending agent states");
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(ServerResponse { agents }),
    )
}

async fn get_agents(State(world): State<SharedWorld>) -> impl IntoResponse {
    let agents = world.lock().await.states();
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(ServerResponse { agents }),
    )
}

async fn health() -> &'static str {
    "ok"
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: &str, world: World) -> std::io::Result<()> {
    let app = build_router(Arc::new(Mutex::new(world)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
