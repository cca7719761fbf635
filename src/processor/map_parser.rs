//! Parser for the `map` file.
//! Rebuilds the flat world chunk grid out of its superchunks, then reads the
//! dungeon levels stored right behind it.

use crate::error::Result;
use crate::model::{
    ChunkIndex, DUNGEON_DIM, DUNGEON_LEVELS, Grid, Resource, SUPERCHUNK_DIM, SUPERCHUNK_GRID,
    WORLD_DIM,
};
use crate::processor::cursor::ByteCursor;
use crate::processor::index_grid::{read_rows, row_len};

/// `superchunk[row][col]` chunk indices (16×16).
pub type Superchunk = Vec<Vec<ChunkIndex>>;

/// Bytes taken by the world part of the map file.
pub const WORLD_BYTES: usize =
    SUPERCHUNK_GRID * SUPERCHUNK_GRID * SUPERCHUNK_DIM * row_len(SUPERCHUNK_DIM);
/// Bytes taken by one dungeon level.
pub const DUNGEON_BYTES: usize = DUNGEON_DIM * row_len(DUNGEON_DIM);

pub struct ParsedMap {
    pub world: Grid,
    pub dungeons: Vec<Grid>,
}

/// Decode the world map followed by the five dungeon levels.
pub fn parse_map(resource: &Resource) -> Result<ParsedMap> {
    let mut cursor = ByteCursor::new(&resource.name, &resource.bytes);
    let world = read_world(&mut cursor)?;
    log::info!(
        "{}: world map {}x{} chunks",
        resource.name,
        world.width(),
        world.height()
    );

    let dungeons = read_dungeons(&mut cursor)?;
    log::info!("{}: {} dungeon levels", resource.name, dungeons.len());

    if cursor.remaining() > 0 {
        log::debug!(
            "{}: {} trailing bytes after dungeon levels",
            resource.name,
            cursor.remaining()
        );
    }

    Ok(ParsedMap { world, dungeons })
}

pub fn read_superchunk(cursor: &mut ByteCursor<'_>) -> Result<Superchunk> {
    cursor.section("superchunk");
    read_rows(cursor, SUPERCHUNK_DIM, SUPERCHUNK_DIM)
}

/// Read the 8×8 superchunks (row-major) and flatten them into 128×128.
pub fn read_world(cursor: &mut ByteCursor<'_>) -> Result<Grid> {
    let mut blocks: Vec<Vec<Superchunk>> = Vec::with_capacity(SUPERCHUNK_GRID);
    for _ in 0..SUPERCHUNK_GRID {
        let block_row = (0..SUPERCHUNK_GRID)
            .map(|_| read_superchunk(cursor))
            .collect::<Result<Vec<_>>>()?;
        blocks.push(block_row);
    }
    Ok(flatten_world(&blocks))
}

/// Output row `block_row * 16 + r` is row `r` of every superchunk in that
/// block row, concatenated in block-column order.
pub fn flatten_world(blocks: &[Vec<Superchunk>]) -> Grid {
    let mut rows = Vec::with_capacity(WORLD_DIM);
    for block_row in blocks {
        for r in 0..SUPERCHUNK_DIM {
            let mut row = Vec::with_capacity(WORLD_DIM);
            for superchunk in block_row {
                row.extend_from_slice(&superchunk[r]);
            }
            rows.push(row);
        }
    }
    Grid::from_rows(rows)
}

pub fn read_dungeon(cursor: &mut ByteCursor<'_>) -> Result<Grid> {
    cursor.section("dungeon level");
    Ok(Grid::from_rows(read_rows(cursor, DUNGEON_DIM, DUNGEON_DIM)?))
}

pub fn read_dungeons(cursor: &mut ByteCursor<'_>) -> Result<Vec<Grid>> {
    (0..DUNGEON_LEVELS).map(|_| read_dungeon(cursor)).collect()
}
