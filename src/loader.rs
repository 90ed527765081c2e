use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{GridError, LoadError};
use crate::grid::Grid;

/// Load a grid file.
///
/// - `.npy`: NumPy 2-D integer array
/// - `.json`: nested integer array
/// - anything else: text with one row per line
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<Grid, LoadError> {
    let path = path.as_ref();
    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let grid = match path.extension().and_then(|s| s.to_str()) {
        Some("npy") => parse_npy_grid(&fs::read(path).map_err(io_error)?)?,
        Some("json") => parse_json_grid(&fs::read_to_string(path).map_err(io_error)?)?,
        _ => parse_text_grid(&fs::read_to_string(path).map_err(io_error)?)?,
    };

    info!(
        path = %path.display(),
        rows = grid.rows,
        cols = grid.cols,
        codes = ?grid.unique_codes(),
        "grid loaded"
    );
    Ok(grid)
}

/// Decode a NumPy `.npy` file holding a 2-D array of any integer dtype,
/// in either C or Fortran order
pub fn parse_npy_grid(bytes: &[u8]) -> Result<Grid, LoadError> {
    let npy = npyz::NpyFile::new(bytes).map_err(LoadError::NpyHeader)?;
    let shape = npy.shape().to_vec();
    let [rows, cols] = shape[..] else {
        return Err(LoadError::NpyShape { shape });
    };
    let fortran = matches!(npy.order(), npyz::Order::Fortran);
    let dtype = format!("{:?}", npy.dtype());

    let values = read_npy_ints::<i64>(bytes)
        .or_else(|| read_npy_ints::<i32>(bytes))
        .or_else(|| read_npy_ints::<i16>(bytes))
        .or_else(|| read_npy_ints::<i8>(bytes))
        .or_else(|| read_npy_ints::<u32>(bytes))
        .or_else(|| read_npy_ints::<u16>(bytes))
        .or_else(|| read_npy_ints::<u8>(bytes))
        .ok_or(LoadError::NpyDtype { dtype })?;

    let (rows, cols) = (rows as usize, cols as usize);
    if values.len() != rows * cols {
        return Err(LoadError::NpyShape { shape });
    }

    let mut grid_rows = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut row = Vec::with_capacity(cols);
        for c in 0..cols {
            let value = if fortran { values[c * rows + r] } else { values[r * cols + c] };
            row.push(i32::try_from(value).map_err(|_| LoadError::NpyValue { value })?);
        }
        grid_rows.push(row);
    }

    Ok(Grid::from_rows(grid_rows)?)
}

/// Read the array body as `T`; `None` when the dtype is not `T`
fn read_npy_ints<T>(bytes: &[u8]) -> Option<Vec<i64>>
where
    T: npyz::Deserialize + Into<i64>,
{
    let npy = npyz::NpyFile::new(bytes).ok()?;
    let values: Vec<T> = npy.into_vec().ok()?;
    Some(values.into_iter().map(Into::into).collect())
}

/// Parse `[[1, 2], [-1, 4]]`
pub fn parse_json_grid(contents: &str) -> Result<Grid, LoadError> {
    let rows: Vec<Vec<i32>> = serde_json::from_str(contents)?;
    Ok(Grid::from_rows(rows)?)
}

/// Parse rows of integers separated by commas and/or whitespace.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_text_grid(contents: &str) -> Result<Grid, GridError> {
    let mut rows = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token.parse::<i32>().map_err(|_| GridError::BadValue {
                    line: index + 1,
                    value: token.to_string(),
                })
            })
            .collect::<Result<Vec<i32>, GridError>>()?;
        rows.push(row);
    }

    Grid::from_rows(rows)
}
