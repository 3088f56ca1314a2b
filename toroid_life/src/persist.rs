// persist.rs - Plain-text grid files
//
// Format: `height width` on the first line, then the present generation in
// row-major order, one row per line, cells separated by spaces. The loader
// only cares about whitespace-separated tokens.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::error::LifeError;
use crate::grid::{ALIVE, Cell, DEAD, Grid};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read grid file: {0}")]
    Io(#[from] io::Error),

    #[error("grid file ends before the {0} header value")]
    MissingHeader(&'static str),

    #[error("invalid {field} '{token}' in header")]
    InvalidHeader { field: &'static str, token: String },

    /// Fewer cell tokens than `height * width`.
    #[error("grid file holds {found} of {expected} cells")]
    Truncated { expected: usize, found: usize },

    #[error("cell {index} is '{token}', expected 0 or 1")]
    InvalidCell { index: usize, token: String },

    #[error(transparent)]
    Grid(#[from] LifeError),
}

fn header<'a>(tokens: &mut impl Iterator<Item = &'a str>, field: &'static str) -> Result<usize, LoadError> {
    let token = tokens.next().ok_or(LoadError::MissingHeader(field))?;
    token
        .parse()
        .map_err(|_| LoadError::InvalidHeader { field, token: token.to_string() })
}

/// Parses a grid; any structural problem fails the whole load.
pub fn load<R: Read>(mut reader: R) -> Result<Grid, LoadError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let mut tokens = text.split_whitespace();

    let height = header(&mut tokens, "height")?;
    let width = header(&mut tokens, "width")?;
    let expected = height
        .checked_mul(width)
        .ok_or(LoadError::Grid(LifeError::InvalidDimensions { height, width }))?;

    // Every cell needs at least one byte, which bounds a bogus header
    let mut cells: Vec<Cell> = Vec::with_capacity(expected.min(text.len()));
    for index in 0..expected {
        let token = tokens.next().ok_or(LoadError::Truncated { expected, found: index })?;
        let cell = match token {
            "0" => DEAD,
            "1" => ALIVE,
            _ => return Err(LoadError::InvalidCell { index, token: token.to_string() }),
        };
        cells.push(cell);
    }

    let trailing = tokens.count();
    if trailing > 0 {
        debug!(trailing, "ignoring tokens after the last cell");
    }
    Ok(Grid::from_cells(height, width, cells)?)
}

pub fn load_path(path: impl AsRef<Path>) -> Result<Grid, LoadError> {
    let path = path.as_ref();
    let grid = load(File::open(path)?)?;
    info!(path = %path.display(), height = grid.height(), width = grid.width(), "grid loaded");
    Ok(grid)
}

pub fn save<W: Write>(grid: &Grid, writer: W) -> io::Result<()> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "{} {}", grid.height(), grid.width())?;
    for row in grid.present().chunks(grid.width()) {
        let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()
}

pub fn save_path(grid: &Grid, path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    save(grid, File::create(path)?)?;
    info!(path = %path.display(), "grid saved");
    Ok(())
}
