use std::path::PathBuf;

use thiserror::Error;

use crate::grid::Cell;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,

    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: cannot parse {value:?} as a cost-code")]
    BadValue { line: usize, value: String },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read grid file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("grid file is not a 2-D integer array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid .npy header: {0}")]
    NpyHeader(#[source] std::io::Error),

    #[error(".npy array must be 2-D, found shape {shape:?}")]
    NpyShape { shape: Vec<u64> },

    #[error(".npy dtype {dtype} is not an integer type")]
    NpyDtype { dtype: String },

    #[error(".npy value {value} does not fit a cost-code")]
    NpyValue { value: i64 },

    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorldError {
    #[error("{which} cell {cell} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        which: &'static str,
        cell: Cell,
        rows: i32,
        cols: i32,
    },

    #[error("start cell {0} is an obstacle")]
    StartBlocked(Cell),
}
