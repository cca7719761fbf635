// numeric constants that describe the world / chunk grid
pub const CHUNK_DIM: usize = 8; // tiles per chunk side
pub const CHUNK_COUNT: usize = 1024;

pub const SUPERCHUNK_DIM: usize = 16; // chunks per superchunk side
pub const SUPERCHUNK_GRID: usize = 8; // superchunks per world side
pub const WORLD_DIM: usize = SUPERCHUNK_DIM * SUPERCHUNK_GRID; // 128 chunks

pub const DUNGEON_DIM: usize = 32;
pub const DUNGEON_LEVELS: usize = 5;

pub const TILE_COUNT: usize = 2048;
pub const OBJECT_TYPES: usize = 1024;
pub const GLOBAL_OBJECTS: usize = 256;

/// Row stride of a packed coordinate key.
pub const COORD_STRIDE: u32 = 1024;

use std::collections::{BTreeMap, VecDeque};

use crate::processor::animation::AnimationTable;
use crate::processor::chunk_parser::ChunkTable;
use crate::processor::tile_flags::{BaseTileTable, TileFlagTable};

/// Index into the global tile atlas.
pub type TileId = u16;
/// Index into the chunk table (12 bits on disk, 0..1023 in practice).
pub type ChunkIndex = u16;

/// One file as read from the game directory.
#[derive(Debug, Clone)]
pub struct Resource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Resource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Immediately-after-load representation: every file the decoder needs,
/// still as raw bytes.
#[derive(Debug, Clone)]
pub struct RawGameFiles {
    pub chunks: Resource,
    pub map: Resource,
    pub tileflag: Resource,
    pub basetile: Resource,
    pub animdata: Resource,
    /// World region blocks, `world_blocks[row * 8 + col]`.
    pub world_blocks: Vec<Resource>,
    /// One block per dungeon level.
    pub dungeon_blocks: Vec<Resource>,
    pub objlist: Resource,
}

/// Row-major grid of chunk indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<ChunkIndex>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<ChunkIndex>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let cells: Vec<ChunkIndex> = rows.into_iter().flatten().collect();
        debug_assert_eq!(cells.len(), width * height, "ragged grid rows");
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<ChunkIndex> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    pub fn row(&self, y: usize) -> &[ChunkIndex] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[ChunkIndex]> {
        self.cells.chunks(self.width.max(1))
    }
}

/// Tile-space coordinate packed as `y * 1024 + x`.
///
/// Both axes are 10 bits on disk, so every decoded coordinate fits.
/// Dungeon levels use the same packing with `x, y < 256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord(u32);

impl Coord {
    pub fn new(x: u16, y: u16) -> Self {
        debug_assert!(u32::from(x) < COORD_STRIDE && u32::from(y) < COORD_STRIDE);
        Coord(u32::from(y) * COORD_STRIDE + u32::from(x))
    }

    pub fn key(self) -> u32 {
        self.0
    }

    pub fn x(self) -> u16 {
        (self.0 % COORD_STRIDE) as u16
    }

    pub fn y(self) -> u16 {
        (self.0 / COORD_STRIDE) as u16
    }
}

/// Coordinate → ordered tiles for one map.
///
/// Each cell is a two-ended sequence: the front is drawn above everything
/// behind it, the back is drawn first (closest to the terrain).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectStack {
    cells: BTreeMap<Coord, VecDeque<TileId>>,
}

impl ObjectStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_front(&mut self, at: Coord, tile: TileId) {
        self.cells.entry(at).or_default().push_front(tile);
    }

    pub fn push_back(&mut self, at: Coord, tile: TileId) {
        self.cells.entry(at).or_default().push_back(tile);
    }

    pub fn get(&self, at: Coord) -> Option<&VecDeque<TileId>> {
        self.cells.get(&at)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupied cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &VecDeque<TileId>)> {
        self.cells.iter().map(|(c, tiles)| (*c, tiles))
    }

    /// Concatenate `other` behind the tiles already stacked at each cell.
    pub fn merge(&mut self, other: ObjectStack) {
        for (at, tiles) in other.cells {
            self.cells.entry(at).or_default().extend(tiles);
        }
    }
}

/// One [`ObjectStack`] per map: index 0 is the world surface (z = 0),
/// indices 1..=5 are the dungeon levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapStacks {
    levels: Vec<ObjectStack>,
}

impl Default for MapStacks {
    fn default() -> Self {
        Self {
            levels: vec![ObjectStack::new(); DUNGEON_LEVELS + 1],
        }
    }
}

impl MapStacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, z: usize) -> Option<&ObjectStack> {
        self.levels.get(z)
    }

    pub fn level_mut(&mut self, z: usize) -> Option<&mut ObjectStack> {
        self.levels.get_mut(z)
    }

    pub fn world(&self) -> &ObjectStack {
        &self.levels[0]
    }

    /// Stacks of dungeon level `level` (0-based, i.e. z = level + 1).
    pub fn dungeon(&self, level: usize) -> Option<&ObjectStack> {
        self.levels.get(level + 1)
    }

    pub fn levels(&self) -> &[ObjectStack] {
        &self.levels
    }

    pub fn merge(&mut self, other: MapStacks) {
        for (mine, theirs) in self.levels.iter_mut().zip(other.levels) {
            mine.merge(theirs);
        }
    }
}

/// Fully decoded world handed to writers and other consumers.
pub struct DecodedWorld {
    pub world: Grid,
    pub dungeons: Vec<Grid>,
    pub chunks: ChunkTable,
    pub tile_flags: TileFlagTable,
    pub base_tiles: BaseTileTable,
    pub animations: AnimationTable,
    pub objects: MapStacks,
}

impl DecodedWorld {
    /// Terrain tile at world tile coordinate `(x, y)`, both in 0..1024.
    pub fn world_tile(&self, x: usize, y: usize) -> Option<u8> {
        terrain_tile(&self.world, &self.chunks, x, y)
    }

    /// Terrain tile of dungeon `level` at `(x, y)`, both in 0..256.
    pub fn dungeon_tile(&self, level: usize, x: usize, y: usize) -> Option<u8> {
        terrain_tile(self.dungeons.get(level)?, &self.chunks, x, y)
    }
}

fn terrain_tile(grid: &Grid, chunks: &ChunkTable, x: usize, y: usize) -> Option<u8> {
    let chunk = grid.get(x / CHUNK_DIM, y / CHUNK_DIM)?;
    chunks.tile_at(chunk as usize, y % CHUNK_DIM, x % CHUNK_DIM)
}
