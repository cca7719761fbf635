//! Tile animation table (`animdata`).
//!
//! Layout: `count: u16`, then four parallel arrays of `count` entries each:
//! source tiles (u16), first animation tiles (u16), param1 (u8), param2 (u8).

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Resource, TileId};
use crate::processor::cursor::ByteCursor;

/// First member of a tile's animation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    pub next_tile: TileId,
    /// Frame counter mask in the game engine.
    pub param1: u8,
    /// Frame counter shift in the game engine.
    pub param2: u8,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationTable {
    entries: HashMap<TileId, Animation>,
}

impl AnimationTable {
    pub fn parse(resource: &Resource) -> Result<Self> {
        let mut cursor = ByteCursor::new(&resource.name, &resource.bytes);
        cursor.section("animation count");
        let count = usize::from(cursor.read_u16()?);

        cursor.section("animation source tiles");
        let from = read_u16s(&mut cursor, count)?;
        cursor.section("animation target tiles");
        let to = read_u16s(&mut cursor, count)?;
        cursor.section("animation param1");
        let param1 = cursor.read_bytes(count)?;
        cursor.section("animation param2");
        let param2 = cursor.read_bytes(count)?;

        let mut entries = HashMap::with_capacity(count);
        for i in 0..count {
            // a repeated source tile overrides the earlier entry
            entries.insert(
                from[i],
                Animation {
                    next_tile: to[i],
                    param1: param1[i],
                    param2: param2[i],
                },
            );
        }

        log::info!("{}: {} animated tiles", resource.name, entries.len());
        Ok(Self { entries })
    }

    pub fn get(&self, tile: TileId) -> Option<&Animation> {
        self.entries.get(&tile)
    }

    /// Tile to draw in place of `tile`; tiles without an entry map to
    /// themselves.
    pub fn resolve(&self, tile: TileId) -> TileId {
        self.get(tile).map_or(tile, |a| a.next_tile)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_u16s(cursor: &mut ByteCursor<'_>, count: usize) -> Result<Vec<u16>> {
    (0..count).map(|_| cursor.read_u16()).collect()
}
