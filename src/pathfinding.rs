use crate::grid::{Cell, Grid};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Default bound on frontier pops before a search gives up
pub const MAX_EXPANSIONS: usize = 10_000;

/// Why a search produced no path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchFailure {
    #[error("goal {goal} is an obstacle with no passable cell around it")]
    InvalidGoal { goal: Cell },

    #[error("frontier exhausted after {expanded} expansions")]
    Exhausted { expanded: usize },

    #[error("expansion cap of {cap} reached before the goal")]
    CapReached { cap: usize },
}

/// Full outcome of one search, for callers that need more than the path
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: Result<Vec<Cell>, SearchFailure>,
    /// Goal actually searched for, after relocation
    pub goal: Cell,
    /// Number of frontier pops
    pub expanded: usize,
}

impl SearchReport {
    pub fn path(&self) -> Option<&[Cell]> {
        self.outcome.as_deref().ok()
    }

    pub fn into_path(self) -> Option<Vec<Cell>> {
        self.outcome.ok()
    }
}

/// A node in the search arena. `parent` indexes the arena, never a live reference.
#[derive(Debug, Clone)]
struct SearchNode {
    position: Cell,
    g_cost: u32,
    h_cost: u32,
    parent: Option<usize>,
}

impl SearchNode {
    fn f_cost(&self) -> u32 {
        self.g_cost + self.h_cost
    }
}

/// Frontier entry pointing into the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    f_cost: u32,
    h_cost: u32,
    node: usize,
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default).
        // Ties: lower h first, then the earlier-inserted node.
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Replace an obstacle goal with the first 3x3 neighbour whose code is
/// strictly positive, scanning rows top to bottom and columns left to right.
/// Goals that are not obstacles are returned unchanged.
pub fn relocate_goal(grid: &Grid, goal: Cell) -> Option<Cell> {
    if !grid.is_obstacle(goal) {
        return Some(goal);
    }

    for d_row in -1..=1 {
        for d_col in -1..=1 {
            let candidate = goal.offset(d_row, d_col);
            if matches!(grid.get(candidate), Some(code) if code > 0) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Find the least-cost path from `start` to `goal`.
///
/// Returns `None` for every kind of failure; use [`search`] to tell them apart.
pub fn find_path(grid: &Grid, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    search(grid, start, goal, MAX_EXPANSIONS).into_path()
}

/// A* over the 4-connected cost grid, bounded by `max_expansions` frontier pops.
///
/// `start` and `goal` must be in bounds and `start` should be passable; neither
/// is checked here.
pub fn search(grid: &Grid, start: Cell, goal: Cell, max_expansions: usize) -> SearchReport {
    debug!(%start, %goal, max_expansions, "starting path search");

    let goal = match relocate_goal(grid, goal) {
        Some(relocated) if relocated != goal => {
            warn!(
                original = %goal,
                code = grid.get(goal).unwrap_or_default(),
                relocated = %relocated,
                "goal is an obstacle, using nearby cell instead"
            );
            relocated
        }
        Some(_) => goal,
        None => {
            warn!(%goal, "goal is an obstacle and no passable cell is nearby");
            return SearchReport {
                outcome: Err(SearchFailure::InvalidGoal { goal }),
                goal,
                expanded: 0,
            };
        }
    };

    let mut arena: Vec<SearchNode> = Vec::new();
    let mut frontier: BinaryHeap<FrontierEntry> = BinaryHeap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut best_g: HashMap<Cell, u32> = HashMap::new();

    let h_start = start.manhattan(&goal);
    arena.push(SearchNode {
        position: start,
        g_cost: 0,
        h_cost: h_start,
        parent: None,
    });
    frontier.push(FrontierEntry {
        f_cost: h_start,
        h_cost: h_start,
        node: 0,
    });
    best_g.insert(start, 0);

    let mut expanded = 0;
    loop {
        if expanded >= max_expansions && !frontier.is_empty() {
            debug!(expanded, "no path found, expansion cap reached");
            return SearchReport {
                outcome: Err(SearchFailure::CapReached {
                    cap: max_expansions,
                }),
                goal,
                expanded,
            };
        }

        let Some(entry) = frontier.pop() else {
            debug!(expanded, "no path found, frontier exhausted");
            return SearchReport {
                outcome: Err(SearchFailure::Exhausted { expanded }),
                goal,
                expanded,
            };
        };
        expanded += 1;

        if expanded % 100 == 0 {
            trace!(expanded, frontier = frontier.len(), "exploring");
        }

        let current = arena[entry.node].clone();

        // Stale duplicate of an already expanded position
        if closed.contains(&current.position) {
            continue;
        }

        if current.position == goal {
            let path = reconstruct(&arena, entry.node);
            debug!(
                expanded,
                steps = path.len(),
                cost = current.g_cost,
                "path found"
            );
            return SearchReport {
                outcome: Ok(path),
                goal,
                expanded,
            };
        }

        closed.insert(current.position);

        for next in grid.neighbors(current.position) {
            if closed.contains(&next) {
                continue;
            }

            // Unpriced codes pass the neighbour filter but never enter the frontier
            let Some(step) = grid.cost(next) else {
                continue;
            };
            let g_cost = current.g_cost + step;

            // Only enqueue if this is a better path
            if matches!(best_g.get(&next), Some(&known) if known <= g_cost) {
                continue;
            }
            best_g.insert(next, g_cost);

            let h_cost = next.manhattan(&goal);
            let node = arena.len();
            arena.push(SearchNode {
                position: next,
                g_cost,
                h_cost,
                parent: Some(entry.node),
            });
            frontier.push(FrontierEntry {
                f_cost: arena[node].f_cost(),
                h_cost,
                node,
            });
        }
    }
}

/// Walk parent indices back from `terminal` and return the path start-first
fn reconstruct(arena: &[SearchNode], terminal: usize) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut cursor = Some(terminal);
    while let Some(index) = cursor {
        path.push(arena[index].position);
        cursor = arena[index].parent;
    }
    path.reverse();
    path
}

/// Sum of step costs along a path, excluding the first cell.
/// `None` if any step enters an unpriced cell.
pub fn path_cost(grid: &Grid, path: &[Cell]) -> Option<u32> {
    path.iter().skip(1).map(|&cell| grid.cost(cell)).sum()
}

/// Format path for display
pub fn format_path(path: &[Cell]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|cell| format!("({},{})", cell.row, cell.col))
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<i32>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_frontier_orders_by_f_then_h_then_insertion() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry { f_cost: 5, h_cost: 3, node: 0 });
        heap.push(FrontierEntry { f_cost: 4, h_cost: 4, node: 1 });
        heap.push(FrontierEntry { f_cost: 5, h_cost: 1, node: 2 });
        heap.push(FrontierEntry { f_cost: 5, h_cost: 1, node: 3 });

        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_relocate_goal_scans_row_major() {
        let g = grid(vec![
            vec![-1, 2, 1],
            vec![1, -1, 1],
            vec![1, 1, 1],
        ]);
        assert_eq!(relocate_goal(&g, Cell::new(1, 1)), Some(Cell::new(0, 1)));
    }

    #[test]
    fn test_relocate_goal_skips_zero_codes() {
        let g = grid(vec![
            vec![0, 0, 0],
            vec![0, -1, 0],
            vec![0, 0, 4],
        ]);
        assert_eq!(relocate_goal(&g, Cell::new(1, 1)), Some(Cell::new(2, 2)));
    }

    #[test]
    fn test_relocate_goal_keeps_passable_goal() {
        let g = grid(vec![vec![1, 0]]);
        assert_eq!(relocate_goal(&g, Cell::new(0, 1)), Some(Cell::new(0, 1)));
    }

    #[test]
    fn test_invalid_goal_runs_no_expansions() {
        let g = grid(vec![
            vec![-1, -1, 1],
            vec![-1, -1, 1],
            vec![1, 1, 1],
        ]);
        let report = search(&g, Cell::new(2, 2), Cell::new(0, 0), MAX_EXPANSIONS);
        assert_eq!(
            report.outcome,
            Err(SearchFailure::InvalidGoal { goal: Cell::new(0, 0) })
        );
        assert_eq!(report.expanded, 0);
    }

    #[test]
    fn test_cheaper_detour_beats_short_expensive_route() {
        // Straight across costs 5 + 1 = 6, around the top costs 1 + 1 + 1 + 1 = 4
        let g = grid(vec![
            vec![1, 1, 1],
            vec![1, 5, 1],
        ]);
        let path = find_path(&g, Cell::new(1, 0), Cell::new(1, 2)).unwrap();
        assert_eq!(path_cost(&g, &path), Some(4));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_zero_code_cells_cannot_be_crossed() {
        let g = grid(vec![vec![1, 0, 1]]);
        let report = search(&g, Cell::new(0, 0), Cell::new(0, 2), MAX_EXPANSIONS);
        assert_eq!(report.outcome, Err(SearchFailure::Exhausted { expanded: 1 }));
    }

    #[test]
    fn test_cap_reached_is_reported() {
        let g = Grid::filled(10, 10, 1);
        let report = search(&g, Cell::new(0, 0), Cell::new(9, 9), 5);
        assert_eq!(report.outcome, Err(SearchFailure::CapReached { cap: 5 }));
        assert_eq!(report.expanded, 5);
    }

    #[test]
    fn test_cap_counts_the_goal_pop() {
        // Six pops walk a 1x6 corridor end to end, the last one being the goal
        let g = Grid::filled(1, 6, 1);
        let (start, goal) = (Cell::new(0, 0), Cell::new(0, 5));

        let report = search(&g, start, goal, 6);
        assert_eq!(report.path().map(<[Cell]>::len), Some(6));
        assert_eq!(report.expanded, 6);

        let report = search(&g, start, goal, 5);
        assert_eq!(report.outcome, Err(SearchFailure::CapReached { cap: 5 }));
        assert_eq!(report.expanded, 5);
    }

    #[test]
    fn test_format_path() {
        assert_eq!(format_path(&[]), "No path");
        assert_eq!(
            format_path(&[Cell::new(0, 0), Cell::new(0, 1)]),
            "(0,0) -> (0,1)"
        );
    }
}
