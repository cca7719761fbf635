//! The functional core: raw game files in, decoded world out.
pub mod animation;
pub mod chunk_parser;
pub mod cursor;
pub mod index_grid;
pub mod map_parser;
pub mod object_parser;
pub mod tile_flags;

use crate::config::DecodeConfig;
use crate::error::Result;
use crate::model::{DecodedWorld, RawGameFiles};

use animation::AnimationTable;
use chunk_parser::ChunkTable;
use object_parser::PlacementDecoder;
use tile_flags::{BaseTileTable, TileFlagTable};

/// Runs every decoding pass and returns a read-only structure for writers.
pub fn run(raw: &RawGameFiles, config: &DecodeConfig) -> Result<DecodedWorld> {
    let chunks = ChunkTable::parse(&raw.chunks)?;
    let map = map_parser::parse_map(&raw.map)?;
    let tile_flags = TileFlagTable::parse(&raw.tileflag)?;
    let base_tiles = BaseTileTable::parse(&raw.basetile)?;
    let animations = AnimationTable::parse(&raw.animdata)?;

    let mut decoder = PlacementDecoder::new(&tile_flags, &base_tiles);
    if config.apply_animation {
        decoder = decoder.with_animations(&animations);
    }

    // world regions first, then dungeon levels, merged in that order
    let blocks: Vec<_> = raw
        .world_blocks
        .iter()
        .chain(&raw.dungeon_blocks)
        .collect();
    let mut objects = decoder.decode_regions(&blocks, config.parallel)?;

    let globals = object_parser::read_object_list(&raw.objlist, config.objlist_offset)?;
    decoder.apply_object_list(&raw.objlist.name, &globals, &mut objects)?;

    for (z, level) in objects.levels().iter().enumerate() {
        log::info!("level {z}: {} occupied cells", level.len());
    }

    Ok(DecodedWorld {
        world: map.world,
        dungeons: map.dungeons,
        chunks,
        tile_flags,
        base_tiles,
        animations,
        objects,
    })
}
