//! Parser for object placement records.
//! Region blocks (`objblk??`) and the global list (`objlist`) are resolved
//! into per-map tile stacks, honouring multi-cell footprints and draw order.

use rayon::prelude::*;

use crate::error::{DecodeError, Result};
use crate::model::{Coord, GLOBAL_OBJECTS, MapStacks, Resource, TileId};
use crate::processor::animation::AnimationTable;
use crate::processor::cursor::ByteCursor;
use crate::processor::tile_flags::{BaseTileTable, TileFlagTable};

/// Where the coordinate triplets of the global list start.
pub const OBJLIST_OFFSET: usize = 0x100;

const STATUS_OFF_MAP: u8 = 0x10;

/// One decoded object instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectRecord {
    pub x: u16,
    pub y: u16,
    pub z: u8,
    pub object_type: u16,
    pub frame: u8,
    pub status: u8,
    pub quantity: u8,
    pub quality: u8,
}

/// Unpack the shared `(h, d1, d2)` coordinate triplet into `(x, y, z)`.
///
/// `x` and `y` are 10 bits each, `z` is 4 bits.
pub fn decode_position(h: u8, d1: u8, d2: u8) -> (u16, u16, u8) {
    let x = (u16::from(d1 & 0x03) << 8) | u16::from(h);
    let y = (u16::from(d2 & 0x0f) << 6) | u16::from(d1 >> 2);
    (x, y, d2 >> 4)
}

/// Split a type word into `(object_type, frame)`.
pub fn decode_type(word: u16) -> (u16, u8) {
    (word & 0x3ff, (word >> 10) as u8)
}

impl ObjectRecord {
    /// Read one 8-byte region record.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let [status, h, d1, d2] = cursor.read_array::<4>()?;
        let word = cursor.read_u16()?;
        let [quantity, quality] = cursor.read_array::<2>()?;
        Ok(Self::from_parts(status, [h, d1, d2], word, quantity, quality))
    }

    fn from_parts(status: u8, [h, d1, d2]: [u8; 3], word: u16, quantity: u8, quality: u8) -> Self {
        let (x, y, z) = decode_position(h, d1, d2);
        let (object_type, frame) = decode_type(word);
        Self {
            x,
            y,
            z,
            object_type,
            frame,
            status,
            quantity,
            quality,
        }
    }

    /// Off-map records live inside containers or inventories.
    pub fn on_map(&self) -> bool {
        self.status & STATUS_OFF_MAP == 0
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

/// `count: u16` followed by `count` records.
pub fn read_region_block(resource: &Resource) -> Result<Vec<ObjectRecord>> {
    let mut cursor = ByteCursor::new(&resource.name, &resource.bytes);
    cursor.section("object count");
    let count = cursor.read_u16()?;

    cursor.section("object record");
    (0..count).map(|_| ObjectRecord::parse(&mut cursor)).collect()
}

/// 256 coordinate triplets at `offset`, then 256 type words matched by index.
pub fn read_object_list(resource: &Resource, offset: usize) -> Result<Vec<ObjectRecord>> {
    let mut cursor = ByteCursor::new(&resource.name, &resource.bytes);
    cursor.section("object list");
    cursor.seek(offset)?;

    let positions = (0..GLOBAL_OBJECTS)
        .map(|_| cursor.read_array::<3>())
        .collect::<Result<Vec<_>>>()?;
    let words = (0..GLOBAL_OBJECTS)
        .map(|_| cursor.read_u16())
        .collect::<Result<Vec<_>>>()?;

    Ok(positions
        .into_iter()
        .zip(words)
        .map(|(pos, word)| ObjectRecord::from_parts(0, pos, word, 0, 0))
        .collect())
}

/// Which stacking rule a record follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Anchor cell appended unless the tile is on-top; other cells in front.
    Region,
    /// Every cell in front.
    Global,
}

/// Resolves records into tile stacks using the decoded tile tables.
pub struct PlacementDecoder<'t> {
    flags: &'t TileFlagTable,
    base_tiles: &'t BaseTileTable,
    animations: Option<&'t AnimationTable>,
}

impl<'t> PlacementDecoder<'t> {
    pub fn new(flags: &'t TileFlagTable, base_tiles: &'t BaseTileTable) -> Self {
        Self {
            flags,
            base_tiles,
            animations: None,
        }
    }

    /// Draw the first animation frame of animated tiles.
    pub fn with_animations(mut self, animations: &'t AnimationTable) -> Self {
        self.animations = Some(animations);
        self
    }

    /// Place one record, returning how many cells received a tile.
    ///
    /// The footprint extends left and up from the anchor, height outer and
    /// width inner; the tile id drops by one for every cell visited.
    pub fn place(
        &self,
        source: &str,
        record: &ObjectRecord,
        layer: Layer,
        stacks: &mut MapStacks,
    ) -> Result<usize> {
        if !record.on_map() {
            return Ok(0);
        }
        let Some(stack) = stacks.level_mut(usize::from(record.z)) else {
            log::warn!(
                "{source}: object {} at ({}, {}) on unknown level {}",
                record.object_type,
                record.x,
                record.y,
                record.z
            );
            return Ok(0);
        };

        let anchor = self
            .base_tiles
            .get(record.object_type)?
            .checked_add(TileId::from(record.frame))
            .ok_or_else(|| {
                DecodeError::out_of_range(
                    source,
                    "object tile",
                    record.object_type.into(),
                    TileId::MAX.into(),
                )
            })?;
        let flags = self.flags.get(anchor)?;
        let footprint = flags.footprint;

        let mut placed = 0;
        let mut step: TileId = 0;
        for v in 0..u16::from(footprint.height) {
            for h in 0..u16::from(footprint.width) {
                let tile = anchor.checked_sub(step).ok_or_else(|| {
                    DecodeError::out_of_range(
                        source,
                        "footprint tile",
                        step.into(),
                        usize::from(anchor) + 1,
                    )
                })?;
                step += 1;

                let (Some(x), Some(y)) = (record.x.checked_sub(h), record.y.checked_sub(v))
                else {
                    log::warn!(
                        "{source}: footprint cell of tile {tile} clipped at ({}, {}) - ({h}, {v})",
                        record.x,
                        record.y
                    );
                    continue;
                };

                let drawn = self.animations.map_or(tile, |a| a.resolve(tile));
                let at = Coord::new(x, y);
                let in_front = layer == Layer::Global || flags.ontop || v > 0 || h > 0;
                if in_front {
                    stack.push_front(at, drawn);
                } else {
                    stack.push_back(at, drawn);
                }
                placed += 1;
            }
        }
        Ok(placed)
    }

    /// Decode one region block into its own stacks.
    pub fn decode_region(&self, resource: &Resource) -> Result<MapStacks> {
        let records = read_region_block(resource)?;
        let mut stacks = MapStacks::new();
        let mut placed = 0;
        for record in &records {
            placed += self.place(&resource.name, record, Layer::Region, &mut stacks)?;
        }
        log::debug!(
            "{}: {} records, {} on map, {} cells filled",
            resource.name,
            records.len(),
            records.iter().filter(|r| r.on_map()).count(),
            placed
        );
        Ok(stacks)
    }

    /// Decode every region block and merge them in the given order.
    ///
    /// With `parallel` set the blocks are decoded on the rayon pool; the
    /// merge stays in block order either way, so both modes agree.
    pub fn decode_regions(&self, blocks: &[&Resource], parallel: bool) -> Result<MapStacks> {
        let partials = if parallel {
            blocks
                .par_iter()
                .map(|block| self.decode_region(block))
                .collect::<Result<Vec<_>>>()?
        } else {
            blocks
                .iter()
                .map(|block| self.decode_region(block))
                .collect::<Result<Vec<_>>>()?
        };

        let mut stacks = MapStacks::new();
        for partial in partials {
            stacks.merge(partial);
        }
        Ok(stacks)
    }

    /// Put the global list's objects in front of the region contents.
    pub fn apply_object_list(
        &self,
        source: &str,
        records: &[ObjectRecord],
        stacks: &mut MapStacks,
    ) -> Result<usize> {
        let mut placed = 0;
        for record in records {
            placed += self.place(source, record, Layer::Global, stacks)?;
        }
        log::info!("{source}: {} global objects, {} cells filled", records.len(), placed);
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OBJECT_TYPES, TILE_COUNT};
    use crate::processor::tile_flags::RESERVED_GAP;

    fn encode_position(x: u16, y: u16, z: u8) -> [u8; 3] {
        [
            (x & 0xff) as u8,
            (((y & 0x3f) << 2) | (x >> 8)) as u8,
            ((z << 4) as u16 | (y >> 6)) as u8,
        ]
    }

    fn record(status: u8, x: u16, y: u16, z: u8, object: u16, frame: u8) -> Vec<u8> {
        let mut out = vec![status];
        out.extend(encode_position(x, y, z));
        out.extend((object | (u16::from(frame) << 10)).to_le_bytes());
        out.extend([1, 2]);
        out
    }

    fn block(name: &str, records: &[Vec<u8>]) -> Resource {
        let mut bytes = (records.len() as u16).to_le_bytes().to_vec();
        for r in records {
            bytes.extend(r);
        }
        Resource::new(name, bytes)
    }

    /// Object `n` starts at tile `100 + 10 * n`. Tile flags come from `flags2`.
    fn tables(flags2: &[(usize, u8)]) -> (TileFlagTable, BaseTileTable) {
        let mut tf = vec![0u8; TILE_COUNT * 3 + RESERVED_GAP];
        for &(tile, f) in flags2 {
            tf[TILE_COUNT + tile] = f;
        }
        let mut bt = Vec::new();
        for n in 0..OBJECT_TYPES as u16 {
            bt.extend((100 + 10 * n).min(2047).to_le_bytes());
        }
        (
            TileFlagTable::parse(&Resource::new("tileflag", tf)).unwrap(),
            BaseTileTable::parse(&Resource::new("basetile", bt)).unwrap(),
        )
    }

    fn tiles_at(stacks: &MapStacks, z: usize, x: u16, y: u16) -> Vec<TileId> {
        stacks
            .level(z)
            .unwrap()
            .get(Coord::new(x, y))
            .map(|t| t.iter().copied().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_position_and_type_bits() {
        assert_eq!(decode_position(0xab, 0x16, 0x3f), (683, 965, 3));
        assert_eq!(encode_position(683, 965, 3), [0xab, 0x16, 0x3f]);
        assert_eq!(decode_position(0xff, 0xff, 0xff), (1023, 1023, 15));
        assert_eq!(decode_type(0x15ff), (0x1ff, 5));
        assert_eq!(decode_type(0xffff), (0x3ff, 63));
    }

    #[test]
    fn test_record_fields() {
        let bytes = record(0x31, 300, 200, 0, 0x55, 7);
        let mut c = ByteCursor::new("objblkaa", &bytes);
        let r = ObjectRecord::parse(&mut c).unwrap();

        assert_eq!((r.x, r.y, r.z), (300, 200, 0));
        assert_eq!((r.object_type, r.frame), (0x55, 7));
        assert_eq!((r.status, r.quantity, r.quality), (0x31, 1, 2));
        assert!(!r.on_map());
    }

    #[test]
    fn test_single_cell_object() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let stacks = dec
            .decode_region(&block("objblkaa", &[record(0, 40, 50, 0, 2, 3)]))
            .unwrap();

        assert_eq!(stacks.world().len(), 1);
        assert_eq!(tiles_at(&stacks, 0, 40, 50), vec![123]);
    }

    #[test]
    fn test_two_by_two_footprint() {
        // object 1 frame 0 → tile 110, double width and height, not on top
        let (tf, bt) = tables(&[(110, 0xc0)]);
        let dec = PlacementDecoder::new(&tf, &bt);

        // object 0 (tile 100) already sits on every covered cell
        let mut records: Vec<_> = [(10, 20), (9, 20), (10, 19), (9, 19)]
            .iter()
            .map(|&(x, y)| record(0, x, y, 0, 0, 0))
            .collect();
        records.push(record(0, 10, 20, 0, 1, 0));
        let stacks = dec.decode_region(&block("objblkaa", &records)).unwrap();

        assert_eq!(stacks.world().len(), 4);
        // anchor keeps the back slot
        assert_eq!(tiles_at(&stacks, 0, 10, 20), vec![100, 110]);
        // the rest are drawn in front, ids counting down in traversal order
        assert_eq!(tiles_at(&stacks, 0, 9, 20), vec![109, 100]);
        assert_eq!(tiles_at(&stacks, 0, 10, 19), vec![108, 100]);
        assert_eq!(tiles_at(&stacks, 0, 9, 19), vec![107, 100]);
    }

    #[test]
    fn test_ontop_goes_to_front() {
        let (tf, bt) = tables(&[(110, 0x10)]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let stacks = dec
            .decode_region(&block(
                "objblkaa",
                &[
                    record(0, 5, 5, 0, 1, 0),
                    record(0, 5, 5, 0, 0, 0),
                    record(0, 5, 5, 0, 2, 0),
                ],
            ))
            .unwrap();

        assert_eq!(tiles_at(&stacks, 0, 5, 5), vec![110, 100, 120]);
    }

    #[test]
    fn test_off_map_records_are_ignored() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let stacks = dec
            .decode_region(&block(
                "objblkaa",
                &[record(0x10, 5, 5, 0, 1, 0), record(0x30, 6, 6, 0, 1, 0)],
            ))
            .unwrap();

        assert!(stacks.levels().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_empty_block() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let stacks = dec.decode_region(&block("objblkaa", &[])).unwrap();
        assert_eq!(stacks, MapStacks::new());
    }

    #[test]
    fn test_truncated_block_fails() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let mut res = block("objblkaa", &[record(0, 1, 1, 0, 0, 0), record(0, 2, 2, 0, 0, 0)]);
        res.bytes.truncate(2 + 8 + 5);

        match dec.decode_region(&res) {
            Err(DecodeError::TruncatedInput {
                resource,
                structure,
                offset,
                ..
            }) => {
                assert_eq!(resource, "objblkaa");
                assert_eq!(structure, "object record");
                assert_eq!(offset, 2 + 8 + 4);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
    }

    #[test]
    fn test_records_routed_by_level() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let stacks = dec
            .decode_region(&block(
                "objblkai",
                &[
                    record(0, 3, 4, 1, 0, 0),
                    record(0, 3, 4, 5, 1, 0),
                    record(0, 3, 4, 9, 2, 0),
                ],
            ))
            .unwrap();

        assert!(stacks.world().is_empty());
        assert_eq!(tiles_at(&stacks, 1, 3, 4), vec![100]);
        assert_eq!(tiles_at(&stacks, 5, 3, 4), vec![110]);
        assert_eq!(stacks.dungeon(4), stacks.level(5));
    }

    #[test]
    fn test_footprint_clipped_at_edge() {
        let (tf, bt) = tables(&[(110, 0xc0)]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let stacks = dec
            .decode_region(&block("objblkaa", &[record(0, 0, 1, 0, 1, 0)]))
            .unwrap();

        assert_eq!(stacks.world().len(), 2);
        assert_eq!(tiles_at(&stacks, 0, 0, 1), vec![110]);
        // (-1, 1) dropped, tile 109 skipped
        assert_eq!(tiles_at(&stacks, 0, 0, 0), vec![108]);
    }

    #[test]
    fn test_animation_substitutes_drawn_tile() {
        let (tf, bt) = tables(&[]);
        let mut anim = vec![1, 0];
        anim.extend(110u16.to_le_bytes());
        anim.extend(300u16.to_le_bytes());
        anim.extend([3, 1]);
        let anim = AnimationTable::parse(&Resource::new("animdata", anim)).unwrap();

        let dec = PlacementDecoder::new(&tf, &bt).with_animations(&anim);
        let stacks = dec
            .decode_region(&block(
                "objblkaa",
                &[record(0, 1, 1, 0, 1, 0), record(0, 2, 2, 0, 2, 0)],
            ))
            .unwrap();

        assert_eq!(tiles_at(&stacks, 0, 1, 1), vec![300]);
        assert_eq!(tiles_at(&stacks, 0, 2, 2), vec![120]);
    }

    #[test]
    fn test_regions_concatenate_in_order() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let blocks: Vec<_> = (0..8u16)
            .map(|i| block(&format!("b{i}"), &[record(0, 7, 7, 0, i, 0)]))
            .collect();

        let blocks: Vec<&Resource> = blocks.iter().collect();

        let sequential = dec.decode_regions(&blocks, false).unwrap();
        let parallel = dec.decode_regions(&blocks, true).unwrap();

        assert_eq!(
            tiles_at(&sequential, 0, 7, 7),
            vec![100, 110, 120, 130, 140, 150, 160, 170]
        );
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_global_list_goes_in_front() {
        let (tf, bt) = tables(&[]);
        let dec = PlacementDecoder::new(&tf, &bt);
        let mut stacks = dec
            .decode_region(&block("objblkaa", &[record(0, 9, 9, 0, 0, 0)]))
            .unwrap();

        let mut bytes = vec![0u8; OBJLIST_OFFSET];
        let mut positions = vec![0u8; GLOBAL_OBJECTS * 3];
        let mut words = vec![0u8; GLOBAL_OBJECTS * 2];
        positions[..3].copy_from_slice(&encode_position(9, 9, 0));
        words[..2].copy_from_slice(&(3u16 | (1 << 10)).to_le_bytes());
        positions[3..6].copy_from_slice(&encode_position(20, 30, 2));
        words[2..4].copy_from_slice(&4u16.to_le_bytes());
        bytes.extend(positions);
        bytes.extend(words);
        let objlist = Resource::new("objlist", bytes);

        let globals = read_object_list(&objlist, OBJLIST_OFFSET).unwrap();
        assert_eq!(globals.len(), 256);
        assert!(globals.iter().all(ObjectRecord::on_map));
        assert_eq!((globals[1].x, globals[1].y, globals[1].z), (20, 30, 2));

        dec.apply_object_list("objlist", &globals[..2], &mut stacks)
            .unwrap();
        assert_eq!(tiles_at(&stacks, 0, 9, 9), vec![131, 100]);
        assert_eq!(tiles_at(&stacks, 2, 20, 30), vec![140]);
    }

    #[test]
    fn test_short_object_list_fails() {
        let objlist = Resource::new("objlist", vec![0u8; OBJLIST_OFFSET + 256 * 3 + 100]);
        assert!(matches!(
            read_object_list(&objlist, OBJLIST_OFFSET),
            Err(DecodeError::TruncatedInput { .. })
        ));
        assert!(matches!(
            read_object_list(&objlist, 0x10000),
            Err(DecodeError::OutOfRange { .. })
        ));
    }
}
