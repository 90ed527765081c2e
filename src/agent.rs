use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::grid::{Cell, Grid};
use crate::pathfinding::{search, MAX_EXPANSIONS};

/// Height the client renders agents at
const GROUND_HEIGHT: f32 = 0.5;

/// Where an agent is in its replay loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    /// No path, or cursor at the first cell
    NotStarted,
    /// Somewhere between the first and last cell
    Advancing,
    /// On the last cell; the next update resets to the start
    AtGoal,
}

/// Client-space point: `x` is the column, `z` the row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Cell> for Vector3Data {
    fn from(cell: Cell) -> Self {
        Vector3Data {
            x: cell.col as f32,
            y: GROUND_HEIGHT,
            z: cell.row as f32,
        }
    }
}

/// Per-tick agent state handed to the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Vector3Data,
    pub path: Vec<Vector3Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<Vec<i32>>>,
}

/// An agent that walks one precomputed route forever.
///
/// Each `update` moves one cell along the path. After the last cell the next
/// `update` jumps back to the first one and reports `false`.
#[derive(Debug, Clone)]
pub struct AgentReplay {
    initial_start: Cell,
    goal: Cell,
    grid: Arc<Grid>,
    max_expansions: usize,
    path: Option<Vec<Cell>>,
    cursor: usize,
    has_computed: bool,
}

impl AgentReplay {
    /// Create an agent and plan its route immediately
    pub fn new(start: Cell, goal: Cell, grid: Arc<Grid>) -> Self {
        Self::with_max_expansions(start, goal, grid, MAX_EXPANSIONS)
    }

    /// Same as [`AgentReplay::new`] with a custom expansion cap
    pub fn with_max_expansions(start: Cell, goal: Cell, grid: Arc<Grid>, max_expansions: usize) -> Self {
        info!(%start, %goal, "creating agent");
        let mut agent = AgentReplay {
            initial_start: start,
            goal,
            grid,
            max_expansions,
            path: None,
            cursor: 0,
            has_computed: false,
        };
        agent.compute_path();
        agent
    }

    /// Run the search once. Later calls do nothing, even after a failure.
    pub fn compute_path(&mut self) {
        if self.has_computed {
            return;
        }
        self.has_computed = true;

        let report = search(&self.grid, self.initial_start, self.goal, self.max_expansions);
        match report.outcome {
            Ok(path) => {
                info!(steps = path.len(), goal = %report.goal, "path computed");
                self.path = Some(path);
            }
            Err(failure) => {
                warn!(start = %self.initial_start, %failure, "agent will stay at its start");
            }
        }
    }

    /// Advance one step along the path.
    /// Returns true if the agent moved, false if it looped back (or has no path).
    pub fn update(&mut self) -> bool {
        match &self.path {
            Some(path) if self.cursor + 1 < path.len() => {
                self.cursor += 1;
                true
            }
            _ => {
                self.cursor = 0;
                false
            }
        }
    }

    /// Cell the agent currently occupies
    pub fn current_position(&self) -> Cell {
        match &self.path {
            Some(path) => path[self.cursor],
            None => self.initial_start,
        }
    }

    /// Where the replay stands. An agent without a path stays `NotStarted`.
    pub fn phase(&self) -> ReplayPhase {
        match &self.path {
            Some(path) if self.cursor + 1 == path.len() => ReplayPhase::AtGoal,
            Some(_) if self.cursor > 0 => ReplayPhase::Advancing,
            _ => ReplayPhase::NotStarted,
        }
    }

    /// Planned route start-first, `None` if the search failed
    pub fn path(&self) -> Option<&[Cell]> {
        self.path.as_deref()
    }

    /// Index into the path of the current position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn initial_start(&self) -> Cell {
        self.initial_start
    }

    /// Goal as requested; the path may end at a relocated cell
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Whether the one-shot search has run
    pub fn has_computed(&self) -> bool {
        self.has_computed
    }

    /// Snapshot for serialization. The grid is only needed for the first render.
    pub fn state(&self, include_grid: bool) -> AgentState {
        AgentState {
            position: self.current_position().into(),
            path: self
                .path
                .iter()
                .flatten()
                .map(|&cell| cell.into())
                .collect(),
            grid: include_grid.then(|| self.grid.to_rows()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor(len: i32) -> Arc<Grid> {
        Arc::new(Grid::filled(1, len, 1))
    }

    #[test]
    fn test_agent_walks_then_loops() {
        let mut agent = AgentReplay::new(Cell::new(0, 0), Cell::new(0, 3), corridor(4));
        assert_eq!(agent.path().map(|p| p.len()), Some(4));
        assert_eq!(agent.phase(), ReplayPhase::NotStarted);

        assert!(agent.update());
        assert_eq!(agent.phase(), ReplayPhase::Advancing);
        assert!(agent.update());
        assert!(agent.update());
        assert_eq!(agent.current_position(), Cell::new(0, 3));
        assert_eq!(agent.phase(), ReplayPhase::AtGoal);

        assert!(!agent.update());
        assert_eq!(agent.current_position(), Cell::new(0, 0));
        assert_eq!(agent.phase(), ReplayPhase::NotStarted);

        assert!(agent.update());
        assert_eq!(agent.current_position(), Cell::new(0, 1));
    }

    #[test]
    fn test_agent_without_path_stays_put() {
        let grid = Arc::new(Grid::from_rows(vec![vec![1, -1, 1]]).unwrap());
        let mut agent = AgentReplay::new(Cell::new(0, 0), Cell::new(0, 2), grid);
        assert!(agent.has_computed());
        assert!(agent.path().is_none());
        for _ in 0..3 {
            assert!(!agent.update());
            assert_eq!(agent.current_position(), Cell::new(0, 0));
        }
        assert!(agent.state(false).path.is_empty());
    }

    #[test]
    fn test_compute_path_is_idempotent() {
        let mut agent = AgentReplay::new(Cell::new(0, 0), Cell::new(0, 2), corridor(3));
        agent.update();
        agent.compute_path();
        assert_eq!(agent.cursor(), 1);
        assert_eq!(agent.path().map(|p| p.len()), Some(3));
    }

    #[test]
    fn test_state_uses_column_as_x_and_row_as_z() {
        let grid = Arc::new(Grid::filled(3, 3, 1));
        let agent = AgentReplay::new(Cell::new(2, 0), Cell::new(2, 1), grid);
        let state = agent.state(true);
        assert_eq!(state.position, Vector3Data { x: 0.0, y: 0.5, z: 2.0 });
        assert_eq!(state.path.len(), 2);
        assert_eq!(state.path[1], Vector3Data { x: 1.0, y: 0.5, z: 2.0 });
        assert_eq!(state.grid.map(|rows| rows.len()), Some(3));
        assert!(agent.state(false).grid.is_none());
    }
}
