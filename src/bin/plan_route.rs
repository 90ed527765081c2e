//! Route preview
//!
//! Plans one route on a grid file (or the demo layout) and prints the steps,
//! their costs and a text rendering of the route.
use std::collections::HashSet;
use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context};
use streetpath::grid::{step_cost, Cell, Grid};
use streetpath::loader::load_grid;
use streetpath::pathfinding::{path_cost, search, MAX_EXPANSIONS};

fn main() -> anyhow::Result<ExitCode> {
    streetpath::init_tracing("warn");

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <grid-file|--demo> <row,col> <row,col>", args[0]);
        eprintln!("Plans a least-cost route from the first cell to the second");
        return Ok(ExitCode::FAILURE);
    }

    let grid = if args[1] == "--demo" {
        Grid::demo_streets()
    } else {
        load_grid(&args[1]).with_context(|| format!("loading {}", args[1]))?
    };
    let start = parse_cell(&args[2])?;
    let goal = parse_cell(&args[3])?;
    for cell in [start, goal] {
        if !grid.in_bounds(cell) {
            bail!("{} is outside the {}x{} grid", cell, grid.rows, grid.cols);
        }
    }

    println!("Grid: {} rows x {} cols", grid.rows, grid.cols);
    println!("Codes: {:?}", grid.unique_codes());
    println!("\nArea around start {} (code {:?}):", start, grid.get(start));
    print!("{}", neighbourhood(&grid, start));
    println!("\nArea around goal {} (code {:?}):", goal, grid.get(goal));
    print!("{}", neighbourhood(&grid, goal));

    let report = search(&grid, start, goal, MAX_EXPANSIONS);
    let path = match report.outcome {
        Ok(path) => path,
        Err(failure) => {
            println!("\nNo path: {} ({} expansions)", failure, report.expanded);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("\nPath found after {} expansions", report.expanded);
    if report.goal != goal {
        println!("Goal relocated to {}", report.goal);
    }
    if let Some(total) = path_cost(&grid, &path) {
        println!("Total cost: {}", total);
    }
    for (i, cell) in path.iter().enumerate() {
        let cost = grid.get(*cell).and_then(step_cost);
        match cost {
            Some(c) if i > 0 => println!("  step {:3}: {} cost {}", i, cell, c),
            _ => println!("  step {:3}: {}", i, cell),
        }
    }

    println!();
    print!("{}", render(&grid, &path, start, report.goal));
    Ok(ExitCode::SUCCESS)
}

fn parse_cell(arg: &str) -> anyhow::Result<Cell> {
    let (row, col) = arg
        .split_once(',')
        .with_context(|| format!("expected row,col but got {:?}", arg))?;
    Ok(Cell::new(row.trim().parse()?, col.trim().parse()?))
}

/// 3x3 block of codes centred on `center`, clipped to the grid
fn neighbourhood(grid: &Grid, center: Cell) -> String {
    let mut out = String::new();
    for d_row in -1..=1 {
        let mut line = Vec::new();
        for d_col in -1..=1 {
            if let Some(code) = grid.get(center.offset(d_row, d_col)) {
                line.push(format!("{:3}", code));
            }
        }
        if !line.is_empty() {
            out.push_str(&line.join(" "));
            out.push('\n');
        }
    }
    out
}

fn render(grid: &Grid, path: &[Cell], start: Cell, goal: Cell) -> String {
    let on_path: HashSet<Cell> = path.iter().copied().collect();
    let mut out = String::new();
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let cell = Cell::new(row, col);
            let symbol = if cell == start {
                'S'
            } else if cell == goal {
                'G'
            } else if on_path.contains(&cell) {
                '*'
            } else if grid.is_obstacle(cell) {
                '#'
            } else {
                '.'
            };
            out.push(symbol);
        }
        out.push('\n');
    }
    out
}
