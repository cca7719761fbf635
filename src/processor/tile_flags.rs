//! Per-tile flags (`tileflag`) and per-object base tiles (`basetile`).

use crate::error::{DecodeError, Result};
use crate::model::{OBJECT_TYPES, Resource, TILE_COUNT, TileId};
use crate::processor::cursor::ByteCursor;

/// Unused gap between the second and third flag table.
pub const RESERVED_GAP: usize = 1024;

const FLAG1_BLOCKED: u8 = 0x02;
const FLAG2_ONTOP: u8 = 0x10;
const FLAG2_DOUBLE_HEIGHT: u8 = 0x40;
const FLAG2_DOUBLE_WIDTH: u8 = 0x80;

/// How many cells, counted left and up from the anchor, a tile covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub width: u8,
    pub height: u8,
}

impl Footprint {
    pub const SINGLE: Footprint = Footprint {
        width: 1,
        height: 1,
    };

    pub fn cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileFlags {
    pub passable: bool,
    /// Always drawn above the rest of its cell.
    pub ontop: bool,
    pub footprint: Footprint,
    /// Raw bytes from the first three tables. The third one is not
    /// interpreted.
    pub raw: [u8; 3],
}

impl TileFlags {
    pub fn from_raw(flags1: u8, flags2: u8, flags3: u8) -> Self {
        Self {
            passable: flags1 & FLAG1_BLOCKED == 0,
            ontop: flags2 & FLAG2_ONTOP != 0,
            footprint: Footprint {
                width: if flags2 & FLAG2_DOUBLE_WIDTH != 0 { 2 } else { 1 },
                height: if flags2 & FLAG2_DOUBLE_HEIGHT != 0 { 2 } else { 1 },
            },
            raw: [flags1, flags2, flags3],
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileFlagTable {
    resource: String,
    flags: Vec<TileFlags>,
}

impl TileFlagTable {
    /// Layout: flags1[2048], flags2[2048], 1024 reserved bytes, flags3[2048].
    pub fn parse(resource: &Resource) -> Result<Self> {
        let mut cursor = ByteCursor::new(&resource.name, &resource.bytes);

        cursor.section("flag table 1");
        let flags1 = cursor.read_bytes(TILE_COUNT)?;
        cursor.section("flag table 2");
        let flags2 = cursor.read_bytes(TILE_COUNT)?;
        cursor.section("reserved gap");
        cursor.skip(RESERVED_GAP)?;
        cursor.section("flag table 3");
        let flags3 = cursor.read_bytes(TILE_COUNT)?;

        let flags = (0..TILE_COUNT)
            .map(|i| TileFlags::from_raw(flags1[i], flags2[i], flags3[i]))
            .collect::<Vec<_>>();

        log::info!(
            "{}: {} tiles, {} impassable, {} on top, {} multi-cell",
            resource.name,
            flags.len(),
            flags.iter().filter(|f| !f.passable).count(),
            flags.iter().filter(|f| f.ontop).count(),
            flags.iter().filter(|f| f.footprint != Footprint::SINGLE).count(),
        );

        Ok(Self {
            resource: resource.name.clone(),
            flags,
        })
    }

    pub fn get(&self, tile: TileId) -> Result<&TileFlags> {
        self.flags.get(usize::from(tile)).ok_or_else(|| {
            DecodeError::out_of_range(&self.resource, "tile flags", tile.into(), TILE_COUNT)
        })
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileFlags> {
        self.flags.iter()
    }
}

/// Object type → tile id of its first frame.
#[derive(Debug, Clone)]
pub struct BaseTileTable {
    resource: String,
    tiles: Vec<TileId>,
}

impl BaseTileTable {
    pub fn parse(resource: &Resource) -> Result<Self> {
        let mut cursor = ByteCursor::new(&resource.name, &resource.bytes);
        cursor.section("base tile");

        let tiles = (0..OBJECT_TYPES)
            .map(|_| cursor.read_u16())
            .collect::<Result<Vec<_>>>()?;

        log::info!("{}: {} object base tiles", resource.name, tiles.len());
        Ok(Self {
            resource: resource.name.clone(),
            tiles,
        })
    }

    pub fn get(&self, object_type: u16) -> Result<TileId> {
        self.tiles
            .get(usize::from(object_type))
            .copied()
            .ok_or_else(|| {
                DecodeError::out_of_range(
                    &self.resource,
                    "base tile",
                    object_type.into(),
                    OBJECT_TYPES,
                )
            })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
