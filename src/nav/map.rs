use serde::{Serialize, Deserialize};
use crate::nav::pathfinding::Cell;
use crate::nav::structures::Grid;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use flate2::write::ZlibEncoder;
use flate2::read::ZlibDecoder;
use flate2::Compression;

pub const MAP_VERSION: u32 = 1;

/// A grid plus the endpoints of the query stored with it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GridMap {
    pub version: u32,
    pub grid: Grid,
    pub start: Option<Cell>,
    pub goal: Option<Cell>,
}

impl GridMap {
    pub fn new(grid: Grid, start: Option<Cell>, goal: Option<Cell>) -> Self {
        Self { version: MAP_VERSION, grid, start, goal }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    VersionMismatch { found: u32, expected: u32 },
    EndpointOutOfBounds { cell: Cell, width: usize, height: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::VersionMismatch { found, expected } => {
                write!(f, "map version {} is not supported (expected {})", found, expected)
            }
            MapError::EndpointOutOfBounds { cell, width, height } => {
                write!(f, "stored endpoint {} lies outside the {}x{} grid", cell, width, height)
            }
        }
    }
}

impl std::error::Error for MapError {}

/// Write `map_data` as zlib-compressed bincode.
pub fn save_map(path: impl AsRef<Path>, map_data: &GridMap) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, map_data)?;
    encoder.finish()?.flush()?;
    Ok(())
}

pub fn load_map(path: impl AsRef<Path>) -> Result<GridMap, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let map_data: GridMap = bincode::deserialize_from(&mut decoder)?;
    if map_data.version != MAP_VERSION {
        return Err(MapError::VersionMismatch { found: map_data.version, expected: MAP_VERSION }.into());
    }
    for cell in [map_data.start, map_data.goal].into_iter().flatten() {
        if !map_data.grid.in_bounds(cell) {
            let (width, height) = (map_data.grid.width(), map_data.grid.height());
            return Err(MapError::EndpointOutOfBounds { cell, width, height }.into());
        }
    }
    Ok(map_data)
}

/// Read a map in the grid text format, taking endpoints from the `S` / `G` markers.
pub fn load_text_map(path: impl AsRef<Path>) -> Result<GridMap, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let parsed = Grid::parse_with_endpoints(&contents)?;
    Ok(GridMap::new(parsed.grid, parsed.start, parsed.goal))
}
