pub mod agent;
pub mod config;
pub mod error;
pub mod grid;
pub mod loader;
pub mod pathfinding;
pub mod server;
pub mod world;

pub use agent::{AgentReplay, AgentState, ReplayPhase};
pub use config::Config;
pub use grid::{Cell, Grid};
pub use pathfinding::{find_path, search, SearchFailure};
pub use world::World;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
