use anyhow::Context;
use streetpath::config::{Config, CONFIG_FILE};
use streetpath::{loader, server, Grid, World};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read the file before logging is up so its filter can be applied
    let loaded = Config::from_file(CONFIG_FILE);
    let filter = match &loaded {
        Ok(config) => config.logging.filter.clone(),
        Err(_) => "info".to_string(),
    };
    streetpath::init_tracing(&filter);
    let config = Config::or_default(loaded);

    let grid = match &config.grid.path {
        Some(path) => loader::load_grid(path)
            .with_context(|| format!("loading grid from {}", path.display()))?,
        None => {
            info!("no grid file configured, using the demo street layout");
            Grid::demo_streets()
        }
    };

    let world = World::from_config(&config, grid).context("spawning agents")?;
    info!(
        rows = world.grid().rows,
        cols = world.grid().cols,
        agents = world.len(),
        "serving world"
    );
    server::serve(&config.bind_address(), world).await?;
    Ok(())
}
