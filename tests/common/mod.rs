#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use streetpath::{Cell, Grid};

/// Parse a text map into a grid plus the `S` and `G` markers (if any)
///
/// Format:
/// - `#`: obstacle (-1)
/// - `.`: cost-1 street
/// - `0`-`9`: that cost-code
/// - `S` / `G`: cost-1 street holding the start / goal
pub fn parse_map(map: &str) -> (Grid, Option<Cell>, Option<Cell>) {
    let mut rows = Vec::new();
    let mut start = None;
    let mut goal = None;

    for line in map.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let row_index = rows.len() as i32;
        let mut row = Vec::new();
        for (col, ch) in line.chars().enumerate() {
            let code = match ch {
                '#' => -1,
                '.' => 1,
                'S' => {
                    start = Some(Cell::new(row_index, col as i32));
                    1
                }
                'G' => {
                    goal = Some(Cell::new(row_index, col as i32));
                    1
                }
                d if d.is_ascii_digit() => d.to_digit(10).unwrap() as i32,
                other => panic!("unexpected map character {:?}", other),
            };
            row.push(code);
        }
        rows.push(row);
    }

    (Grid::from_rows(rows).expect("map rows must be equal length"), start, goal)
}

/// The 20x30 street grid with a 3-wide wall across column 10, rows 0..=15
pub fn walled_streets() -> Grid {
    Grid::demo_streets()
}

/// Exhaustive Dijkstra over the same cost model, used as an oracle
pub fn cheapest_cost(grid: &Grid, start: Cell, goal: Cell) -> Option<u32> {
    let mut best: HashMap<Cell, u32> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(start, 0);
    heap.push(Reverse((0u32, start)));

    while let Some(Reverse((cost, cell))) = heap.pop() {
        if cell == goal {
            return Some(cost);
        }
        if best.get(&cell).is_some_and(|&b| b < cost) {
            continue;
        }
        for next in grid.neighbors(cell) {
            let Some(step) = grid.cost(next) else { continue };
            let candidate = cost + step;
            if best.get(&next).map_or(true, |&b| candidate < b) {
                best.insert(next, candidate);
                heap.push(Reverse((candidate, next)));
            }
        }
    }
    None
}

/// Panic unless every consecutive pair of cells is orthogonally adjacent
pub fn assert_connected(path: &[Cell]) {
    for pair in path.windows(2) {
        assert_eq!(
            pair[0].manhattan(&pair[1]),
            1,
            "cells {} and {} are not adjacent",
            pair[0],
            pair[1]
        );
    }
}
