use std::sync::Arc;

use tracing::info;

use crate::agent::{AgentReplay, AgentState};
use crate::config::{Config, SearchConfig};
use crate::error::WorldError;
use crate::grid::{Cell, Grid};

/// Owns the shared grid and every agent walking on it
#[derive(Debug)]
pub struct World {
    grid: Arc<Grid>,
    agents: Vec<AgentReplay>,
    max_expansions: usize,
    include_grid: bool,
}

impl World {
    /// Empty world; agents spawned later search with `search.max_expansions`
    pub fn new(grid: Grid, search: &SearchConfig) -> Self {
        World {
            grid: Arc::new(grid),
            agents: Vec::new(),
            max_expansions: search.max_expansions,
            include_grid: true,
        }
    }

    /// Build a world and spawn every agent listed in the config
    pub fn from_config(config: &Config, grid: Grid) -> Result<Self, WorldError> {
        let mut world = World::new(grid, &config.search);
        world.include_grid = config.server.include_grid;

        for agent in &config.agents {
            world.spawn_agent(agent.start(), agent.goal())?;
        }

        info!(agents = world.agents.len(), "world ready");
        Ok(world)
    }

    /// Validate the endpoints, then create an agent (which plans immediately).
    /// Returns the agent's index.
    pub fn spawn_agent(&mut self, start: Cell, goal: Cell) -> Result<usize, WorldError> {
        for (which, cell) in [("start", start), ("goal", goal)] {
            if !self.grid.in_bounds(cell) {
                return Err(WorldError::OutOfBounds {
                    which,
                    cell,
                    rows: self.grid.rows,
                    cols: self.grid.cols,
                });
            }
        }
        if self.grid.is_obstacle(start) {
            return Err(WorldError::StartBlocked(start));
        }

        self.agents.push(AgentReplay::with_max_expansions(
            start,
            goal,
            Arc::clone(&self.grid),
            self.max_expansions,
        ));
        Ok(self.agents.len() - 1)
    }

    /// Advance every agent one step and return their new states
    pub fn tick(&mut self) -> Vec<AgentState> {
        for agent in &mut self.agents {
            agent.update();
        }
        self.states()
    }

    /// Current agent states without advancing
    pub fn states(&self) -> Vec<AgentState> {
        self.agents
            .iter()
            .map(|agent| agent.state(self.include_grid))
            .collect()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn agents(&self) -> &[AgentReplay] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_agent_validates_endpoints() {
        let mut world = World::new(
            Grid::from_rows(vec![vec![-1, 1], vec![1, 1]]).unwrap(),
            &SearchConfig::default(),
        );

        assert_eq!(
            world.spawn_agent(Cell::new(0, 0), Cell::new(1, 1)),
            Err(WorldError::StartBlocked(Cell::new(0, 0)))
        );
        assert!(matches!(
            world.spawn_agent(Cell::new(1, 1), Cell::new(2, 0)),
            Err(WorldError::OutOfBounds { which: "goal", .. })
        ));
        assert_eq!(world.spawn_agent(Cell::new(1, 0), Cell::new(0, 1)), Ok(0));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_tick_advances_every_agent() {
        let mut world = World::new(Grid::filled(2, 4, 1), &SearchConfig::default());
        world.spawn_agent(Cell::new(0, 0), Cell::new(0, 3)).unwrap();
        world.spawn_agent(Cell::new(1, 3), Cell::new(1, 3)).unwrap();

        let states = world.tick();
        assert_eq!(states.len(), 2);
        assert_eq!(world.agents()[0].current_position(), Cell::new(0, 1));
        assert_eq!(world.agents()[1].current_position(), Cell::new(1, 3));
        assert_eq!(states[0].position.x, 1.0);
    }

    #[test]
    fn test_search_cap_reaches_spawned_agents() {
        let tight = SearchConfig { max_expansions: 1 };
        let mut world = World::new(Grid::filled(1, 6, 1), &tight);
        world.spawn_agent(Cell::new(0, 0), Cell::new(0, 5)).unwrap();
        assert!(world.agents()[0].path().is_none());

        let mut world = World::new(Grid::filled(1, 6, 1), &SearchConfig::default());
        world.spawn_agent(Cell::new(0, 0), Cell::new(0, 5)).unwrap();
        assert_eq!(world.agents()[0].path().map(|p| p.len()), Some(6));
        assert_eq!(world.grid().cols, 6);
    }

    #[test]
    fn test_from_config_spawns_default_agent() {
        let world = World::from_config(&Config::default(), Grid::demo_streets()).unwrap();
        assert_eq!(world.len(), 1);
        assert!(world.agents()[0].path().is_some());
        assert!(world.states()[0].grid.is_some());
    }
}
